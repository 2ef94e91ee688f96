use thiserror::Error;

/// Errors that can occur while extracting bookings from an email
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The markup could not be turned into a usable document at all
    #[error("Failed to parse booking markup: {0}")]
    StructuralParse(String),

    /// The body exceeds the configured size cap
    #[error("Email body is {size} bytes, over the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    /// Failed to read input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to render output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
