use crate::scrape::FetchError;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";

#[derive(thiserror::Error, Debug)]
pub enum CardError {
    #[error("{}", INVALID_URL_MESSAGE)]
    InvalidUrl,

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Server error: {0}")]
    Extraction(String),

    #[error("Server error: {0}")]
    Client(#[from] reqwest::Error),
}

impl CardError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Whether this failure is an internal fault rather than bad input or an
    /// unreachable remote.
    pub fn is_internal(&self) -> bool {
        matches!(self, CardError::Extraction(_) | CardError::Client(_))
    }
}
