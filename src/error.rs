use thiserror::Error;

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, FinderError>;

/// Error types that can stop a run before it starts or break local I/O
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure of a single upstream call.
///
/// Values of this type are cached alongside successful payloads, so it must stay
/// cheap to clone and must not hold on to the underlying transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected payload: {0}")]
    DataShape(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::DataShape(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
