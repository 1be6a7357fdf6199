use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Input failed a declared policy (length bounds, rating range, request shape).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generative service answered, but not with the required JSON shape.
    #[error("Upstream format error: {0}")]
    UpstreamFormat(String),

    /// The generative service did not answer within the call's budget.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// The generative service could not be reached or rejected the request.
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// The key-value store holding rating counters is unreachable.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::UpstreamTimeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::UpstreamFormat(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(format!("HTTP timeout: {}", err))
        } else {
            AppError::UpstreamTransport(format!("HTTP error: {}", err))
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::StoreUnavailable(format!("Redis error: {}", err))
    }
}
