//! Schedule source error types.

/// Errors from the remote schedule source.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected XML document
    #[error("XML parse error: {message}")]
    Xml { message: String },

    /// The source has no data for this train on this date
    #[error("no journey found for train {0}")]
    JourneyNotFound(String),

    /// Client could not be constructed from its configuration
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<roxmltree::Error> for ApiError {
    fn from(err: roxmltree::Error) -> Self {
        ApiError::Xml {
            message: err.to_string(),
        }
    }
}
