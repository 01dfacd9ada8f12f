use crate::error::{OneLoginError, Result};
use crate::models::{Credentials, Envelope};
use crate::token::{TokenManager, TOKEN_URI_PATH};
use crate::transport::{api_headers, Headers, HttpTransport, Transport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Wait between verify-factor polls while a push confirmation is pending.
pub const TIME_SLEEP_ON_RESPONSE_PENDING: Duration = Duration::from_secs(15);

/// Upper bound on verify-factor polls for a push confirmation.
pub const MAX_ITER_GET_SAML_RESPONSE: usize = 6;

/// Health of a [`Service`] instance. A fatal failure flips the service to
/// `Degraded`; every later operation short-circuits with that failure until
/// [`Service::reset`] is called, so a known-bad credential or token state
/// does not trigger repeated doomed network calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Ready,
    Degraded(String),
}

/// Top-level OneLogin API handle.
///
/// Owns the credentials, the cached OAuth token, and the role cache. The
/// call model is blocking and single-threaded: a `Service` is meant to be
/// owned by one thread for the duration of a flow invocation; share it
/// across threads only behind external mutual exclusion.
pub struct Service {
    pub(crate) credentials: Credentials,
    pub(crate) custom_url: Option<String>,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) token_manager: TokenManager,
    pub(crate) state: ServiceState,
    pub(crate) poll_interval: Duration,
    pub(crate) roles: HashMap<i64, String>,
    pub(crate) all_roles_loaded: bool,
}

impl Service {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(credentials, Box::new(HttpTransport::new()))
    }

    /// Build a service on a caller-supplied transport.
    pub fn with_transport(credentials: Credentials, transport: Box<dyn Transport>) -> Self {
        Self {
            credentials,
            custom_url: None,
            transport,
            token_manager: TokenManager::new(),
            state: ServiceState::Ready,
            poll_interval: TIME_SLEEP_ON_RESPONSE_PENDING,
            roles: HashMap::new(),
            all_roles_loaded: false,
        }
    }

    /// Override the shard-generated base URL with a custom one.
    pub fn with_custom_url(mut self, url: &str) -> Self {
        self.custom_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Override the push-confirmation poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// Clear a recorded fatal failure so operations may be retried.
    pub fn reset(&mut self) {
        self.state = ServiceState::Ready;
    }

    /// Full URL for an API path, using the custom base when one is set.
    pub(crate) fn url(&self, path: &str) -> String {
        match &self.custom_url {
            Some(base) => format!("{}/{}", base, path),
            None => format!("https://api.{}.onelogin.com/{}", self.credentials.shard, path),
        }
    }

    /// Short-circuit when degraded, then make sure a bearer token is
    /// available. A token acquisition failure is fatal and recorded.
    pub(crate) fn init_check(&mut self) -> Result<()> {
        if let ServiceState::Degraded(message) = &self.state {
            return Err(OneLoginError::Degraded(message.clone()));
        }

        let token_url = self.url(TOKEN_URI_PATH);
        if let Err(err) = self
            .token_manager
            .obtain(&*self.transport, &self.credentials, &token_url)
        {
            return Err(self.record_failure(err));
        }
        Ok(())
    }

    /// Record a fatal failure and pass the error back for propagation.
    pub(crate) fn record_failure(&mut self, err: OneLoginError) -> OneLoginError {
        tracing::warn!("service degraded: {}", err);
        self.state = ServiceState::Degraded(err.to_string());
        err
    }

    pub(crate) fn bearer_headers(&mut self) -> Result<Headers> {
        let token_url = self.url(TOKEN_URI_PATH);
        let token = self
            .token_manager
            .obtain(&*self.transport, &self.credentials, &token_url)?;
        Ok(api_headers(format!("bearer:{}", token.access_token)))
    }

    /// Execute one API exchange and decode the response envelope.
    pub(crate) fn api_request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Envelope<T>> {
        let headers = self.bearer_headers()?;
        let value = self.transport.request(method, url, &headers, body)?;
        Ok(serde_json::from_value(value)?)
    }

    /// All roles, as an id-to-name map. The full set is fetched at most
    /// once; later calls are served from the cache.
    pub fn get_roles(&mut self) -> Result<&HashMap<i64, String>> {
        self.init_check()?;

        if self.all_roles_loaded {
            return Ok(&self.roles);
        }

        let roles = match self.list_roles() {
            Ok(roles) => roles,
            Err(err) => return Err(self.record_failure(err)),
        };
        for role in roles {
            self.roles.insert(role.id, role.name);
        }
        self.all_roles_loaded = true;
        tracing::debug!("role cache loaded, {} roles", self.roles.len());
        Ok(&self.roles)
    }

    /// Name of one role. A cache miss fetches just that role and caches it
    /// without marking the full set as loaded.
    pub fn get_role_name(&mut self, id: i64) -> Result<Option<String>> {
        self.init_check()?;

        if let Some(name) = self.roles.get(&id) {
            return Ok(Some(name.clone()));
        }

        match self.get_role_by_id(id)? {
            Some(role) => {
                self.roles.insert(id, role.name.clone());
                Ok(Some(role.name))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use chrono::Utc;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            subdomain: "acme".to_string(),
            shard: "eu".to_string(),
        }
    }

    fn token_ok() -> serde_json::Value {
        json!({
            "access_token": "tok",
            "created_at": Utc::now().to_rfc3339(),
            "expires_in": 3600,
        })
    }

    fn expect_token(transport: &mut MockTransport) {
        transport
            .expect_request()
            .withf(|_, url, _, _| url.ends_with("auth/oauth2/v2/token"))
            .times(1)
            .returning(|_, _, _, _| Ok(token_ok()));
    }

    #[test]
    fn test_url_uses_shard() {
        let service = Service::with_transport(credentials(), Box::new(MockTransport::new()));
        assert_eq!(
            service.url("api/1/users"),
            "https://api.eu.onelogin.com/api/1/users"
        );
    }

    #[test]
    fn test_url_custom_base_override() {
        let service = Service::with_transport(credentials(), Box::new(MockTransport::new()))
            .with_custom_url("https://mock.example/");
        assert_eq!(service.url("api/1/users"), "https://mock.example/api/1/users");
    }

    #[test]
    fn test_degraded_state_is_sticky_and_resettable() {
        let mut transport = MockTransport::new();
        // Only one token attempt: the second operation must short-circuit.
        transport
            .expect_request()
            .withf(|_, url, _, _| url.ends_with("auth/oauth2/v2/token"))
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "type": "Unauthorized",
                    "message": "bad client credentials",
                    "error": true,
                    "code": 401,
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));

        let first = service.get_roles().unwrap_err();
        assert!(matches!(first, OneLoginError::Auth(_)));
        assert!(matches!(service.state(), ServiceState::Degraded(_)));

        let second = service.get_roles().unwrap_err();
        assert!(matches!(second, OneLoginError::Degraded(_)));

        service.reset();
        assert_eq!(*service.state(), ServiceState::Ready);
    }

    #[test]
    fn test_get_roles_bulk_fetches_once() {
        let mut transport = MockTransport::new();
        expect_token(&mut transport);
        transport
            .expect_request()
            .withf(|_, url, headers, _| {
                url == "https://api.eu.onelogin.com/api/1/roles"
                    && headers[0].1 == "bearer:tok"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "status": {"type": "success", "message": "success", "error": false, "code": 200},
                    "data": [
                        {"id": 1, "name": "admin"},
                        {"id": 2, "name": "auditor"},
                    ],
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));

        let roles = service.get_roles().unwrap().clone();
        assert_eq!(roles.get(&1).map(String::as_str), Some("admin"));
        assert_eq!(roles.len(), 2);

        // Second call is served from the cache; the mock allows no more
        // role requests.
        let cached = service.get_roles().unwrap();
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn test_get_role_name_partial_population() {
        let mut transport = MockTransport::new();
        expect_token(&mut transport);
        transport
            .expect_request()
            .withf(|_, url, _, _| url == "https://api.eu.onelogin.com/api/1/roles/9")
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "status": {"type": "success", "message": "success", "error": false, "code": 200},
                    "data": [{"id": 9, "name": "operator"}],
                }))
            });

        let mut service = Service::with_transport(credentials(), Box::new(transport));

        assert_eq!(service.get_role_name(9).unwrap().as_deref(), Some("operator"));
        // Cache hit: no further request allowed by the mock.
        assert_eq!(service.get_role_name(9).unwrap().as_deref(), Some("operator"));
        // A single lookup must not mark the full set as loaded.
        assert!(!service.all_roles_loaded);
    }
}
