use thiserror::Error;

#[derive(Error, Debug)]
pub enum OneLoginError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OneLogin API error {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("Token acquisition failed: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("SAML payload decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Unexpected verification state: verify_factor reported neither success nor error")]
    UnexpectedVerificationState,

    #[error("Service degraded by earlier failure: {0}")]
    Degraded(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, OneLoginError>;
