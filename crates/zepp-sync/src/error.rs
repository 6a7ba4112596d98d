use thiserror::Error;

/// Main error type for zepp-sync
#[derive(Error, Debug)]
pub enum ZeppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Missing token parameter: {0}")]
    MissingToken(String),

    #[error("Malformed date: {0}")]
    MalformedDate(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Sink write error: {0}")]
    SinkWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZeppError>;

impl ZeppError {
    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication-rejected error from a message
    pub fn auth_rejected(msg: impl Into<String>) -> Self {
        Self::AuthRejected(msg.into())
    }

    /// Create a missing-token error naming the absent parameter
    pub fn missing_token(param: impl Into<String>) -> Self {
        Self::MissingToken(param.into())
    }

    /// Create a malformed-date error from a message
    pub fn malformed_date(msg: impl Into<String>) -> Self {
        Self::MalformedDate(msg.into())
    }

    /// Create an invalid response error from a message
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a sink write error from a message
    pub fn sink_write(msg: impl Into<String>) -> Self {
        Self::SinkWrite(msg.into())
    }
}
