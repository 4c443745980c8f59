//! Error types for the luxmeter service

/// Errors that can occur in the luxmeter service
#[derive(Debug, thiserror::Error)]
pub enum LuxmeterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for luxmeter operations
pub type Result<T> = std::result::Result<T, LuxmeterError>;
