//! OneLogin REST API client.
//!
//! Covers OAuth2 client-credential token acquisition, SAML assertion
//! generation with MFA challenge/response, and user/role operations with
//! cursor pagination and query filtering. The call model is blocking and
//! synchronous; a [`Service`] is meant to be owned by a single thread.
//!
//! ```no_run
//! use onelogin::{Credentials, SamlAuthRequest, Service, StdinPrompt};
//!
//! # fn main() -> onelogin::Result<()> {
//! let mut service = Service::new(Credentials {
//!     client_id: "client-id".to_string(),
//!     client_secret: "client-secret".to_string(),
//!     subdomain: "mycompany".to_string(),
//!     shard: "us".to_string(),
//! });
//!
//! let request = SamlAuthRequest::new("user@mycompany.com", "password", "12345");
//! let assertion = service.saml_authenticate(&request, &StdinPrompt::new())?;
//! println!("{}", String::from_utf8_lossy(&assertion.saml_response));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod query;
pub mod roles;
pub mod saml;
pub mod service;
pub mod token;
pub mod transport;
pub mod users;

pub use error::{OneLoginError, Result};
pub use models::{Credentials, Envelope, Pagination, ResultStatus, Role, User};
pub use query::QueryOptions;
pub use saml::assertion::{AwsSamlAssertion, MfaVerifyInfo};
pub use saml::device::{DeviceKind, MfaDevice};
pub use saml::prompt::{MfaPrompt, StdinPrompt};
pub use saml::SamlAuthRequest;
pub use service::{Service, ServiceState};
pub use token::{AccessToken, TokenManager};
pub use transport::{HttpTransport, Transport};
pub use users::{UpdateUserRequest, UserPager};
