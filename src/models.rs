use crate::error::{OneLoginError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// API credentials, fixed for the lifetime of a [`crate::Service`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    /// Account subdomain, e.g. "mycompany" for mycompany.onelogin.com.
    pub subdomain: String,
    /// Service shard the account lives on ("us", "eu", ...).
    pub shard: String,
}

/// Status block carried by every OneLogin response envelope.
///
/// The `error` flag is the authoritative failure signal, independent of the
/// HTTP status code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultStatus {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub code: i64,
}

impl ResultStatus {
    pub fn is_success(&self) -> bool {
        self.kind == "success"
    }

    /// Convert the status block into the error it describes.
    pub fn to_error(&self) -> OneLoginError {
        OneLoginError::Upstream {
            code: self.code,
            message: self.message.clone(),
        }
    }

    /// Fail when the envelope flags an error, whatever the HTTP status was.
    pub fn check(&self) -> Result<()> {
        if self.error {
            return Err(self.to_error());
        }
        Ok(())
    }
}

/// Cursor block returned by paginated list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub before_cursor: Option<String>,
    #[serde(default)]
    pub after_cursor: Option<String>,
}

/// Generic OneLogin response envelope: a status block, an optional
/// pagination block, and the endpoint-specific `data` payload.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub data: Option<T>,
}

/// User resource.
/// See https://developers.onelogin.com/api-docs/1/users/user-resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub state: i64,
    #[serde(rename = "role_id", default)]
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub manager_user_id: Option<i64>,
    #[serde(default)]
    pub member_of: Option<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub custom_attributes: HashMap<String, String>,
}

/// User approval states, for matching the numeric `state` field on
/// [`User`].
/// See https://developers.onelogin.com/api-docs/1/users/user-resource
pub mod user_state {
    pub const UNAPPROVED: i64 = 0;
    pub const APPROVED: i64 = 1;
    pub const REJECTED: i64 = 2;
    pub const UNLICENSED: i64 = 3;
}

/// User statuses, for matching the numeric `status` field on [`User`].
/// Index 6 is unassigned in the API documentation.
pub mod user_status {
    pub const UNACTIVATED: i64 = 0;
    pub const ACTIVE: i64 = 1;
    pub const SUSPENDED: i64 = 2;
    pub const LOCKED: i64 = 3;
    pub const PASSWORD_EXPIRED: i64 = 4;
    pub const PASSWORD_RESET: i64 = 5;
    pub const PASSWORD_PENDING: i64 = 7;
    pub const SECURITY_QUESTIONS: i64 = 8;
}

/// Role resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}
