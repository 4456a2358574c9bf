//! Error types for body and attachment extraction

use thiserror::Error;

/// Errors raised at the edges of the extraction core.
///
/// The resolution pipeline itself never returns these; it logs them and
/// moves on to the next fallback stage.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The transport failed to deliver a part or message
    #[error("Failed to fetch content: {0}")]
    Fetch(String),

    /// A message structure or raw message could not be understood
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// An option value was not recognised
    #[error("Invalid option value: {0}")]
    InvalidOption(String),

    /// The requested content does not exist on the server
    #[error("Content unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Structure(err.to_string())
    }
}

impl From<mailparse::MailParseError> for ExtractError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::Structure(err.to_string())
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
