//! Error types for Faultline

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for Faultline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// Malformed inbound request
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid control-API parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No endpoint registered for the given method and route
    #[error("No such endpoint: {0}")]
    EndpointNotFound(String),

    /// No fault spec configured for the given endpoint key
    #[error("No spec configured for endpoint: {0}")]
    SpecNotFound(String),

    /// Downstream target connection error
    #[error("Failed to reach target: {0}")]
    TargetConnection(String),

    /// Downstream target request timed out
    #[error("Target request timed out")]
    TargetTimeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Middleware pipeline error
    #[error("Middleware error: {0}")]
    Middleware(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP message construction error
    #[error("HTTP error: {0}")]
    HttpBuild(#[from] http::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) | Error::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Error::EndpointNotFound(_) | Error::SpecNotFound(_) => StatusCode::NOT_FOUND,
            Error::TargetConnection(_) | Error::TargetTimeout => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
