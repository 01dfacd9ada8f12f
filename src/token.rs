use crate::error::{OneLoginError, Result};
use crate::models::{Credentials, ResultStatus};
use crate::transport::{api_headers, Transport};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

/// Token endpoint path.
/// See https://developers.onelogin.com/api-docs/1/oauth20-tokens/generate-tokens-2
pub const TOKEN_URI_PATH: &str = "auth/oauth2/v2/token";

/// OAuth2 bearer token obtained through the client-credentials grant.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_in: i64,
    pub account_id: Option<i64>,
}

impl AccessToken {
    /// A token is expired once `created_at + expires_in` is in the past.
    /// No safety margin is subtracted.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.created_at + Duration::seconds(self.expires_in)
    }
}

/// Wire shape of the token endpoint response: the status fields are flat,
/// not nested under a `status` key as on the other endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(flatten)]
    status: ResultStatus,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    account_id: Option<i64>,
}

/// Obtains and caches the OAuth2 bearer token.
///
/// The cached token is replaced wholesale on refresh, never partially
/// updated. A valid cached token is returned without a network call.
#[derive(Default)]
pub struct TokenManager {
    token: Option<AccessToken>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently cached token, valid or not.
    pub fn cached(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    /// Return a valid bearer token, fetching a fresh one when the cache is
    /// empty or expired.
    pub fn obtain(
        &mut self,
        transport: &dyn Transport,
        credentials: &Credentials,
        token_url: &str,
    ) -> Result<AccessToken> {
        match &self.token {
            Some(token) if !token.is_expired() => {}
            _ => {
                let token = self.fetch(transport, credentials, token_url)?;
                tracing::debug!(
                    "obtained access token, expires in {}s",
                    token.expires_in
                );
                self.token = Some(token);
            }
        }
        self.token
            .clone()
            .ok_or_else(|| OneLoginError::Auth("no access token available".to_string()))
    }

    fn fetch(
        &self,
        transport: &dyn Transport,
        credentials: &Credentials,
        token_url: &str,
    ) -> Result<AccessToken> {
        let basic = STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));
        let headers = api_headers(format!("Basic {}", basic));
        let body = json!({"grant_type": "client_credentials"});

        let value = transport
            .request(Method::POST, token_url, &headers, Some(body))
            .map_err(|e| OneLoginError::Auth(e.to_string()))?;
        let response: TokenResponse = serde_json::from_value(value)?;

        if response.status.error {
            return Err(OneLoginError::Auth(response.status.message));
        }

        let access_token = match response.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(OneLoginError::Auth(
                    "unable to obtain an access token with the supplied API keys".to_string(),
                ))
            }
        };

        Ok(AccessToken {
            access_token,
            created_at: response.created_at.unwrap_or_else(Utc::now),
            expires_in: response.expires_in.unwrap_or(0),
            account_id: response.account_id,
        })
    }
}
