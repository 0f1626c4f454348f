use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Poll error: {0}")]
    Poll(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl WatchError {
    /// Errors the scan and poll loops recover from on their next tick.
    /// Everything except configuration problems, which only occur at startup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WatchError::Config(_))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WatchError>;
