//! Error types for card extraction.

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, CardError>;

/// Errors that abort an extraction call.
///
/// A decoder that finds nothing is not an error; only failures that leave
/// no text to decode end up here.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// Layout or config values that cannot produce a usable region
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source image could not be loaded or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Recognition engine failed or produced nothing usable
    #[error("Recognition failed for {region} region: {reason}")]
    Recognition {
        /// Region name ("header" or "body")
        region: String,
        /// Engine message
        reason: String,
    },

    /// Recognition exceeded its deadline
    #[error("Recognition timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Recognition was cancelled before it finished
    #[error("Recognition cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote image could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),
}

impl CardError {
    pub(crate) fn recognition(region: &str, reason: impl Into<String>) -> Self {
        CardError::Recognition {
            region: region.to_string(),
            reason: reason.into(),
        }
    }
}
