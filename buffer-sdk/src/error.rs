use buffer_http::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network, connection or protocol failure, including non-2xx statuses
    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Only returned by the strict operations
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] DecodeFailure),

    /// Unusable token or base URL, detected at construction
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status attached to a transport failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status,
            _ => None,
        }
    }
}

/// Why a buffered body could not be turned into a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("response body is empty")]
    Empty,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("expected a JSON object or array, got {0}")]
    NotAContainer(&'static str),
}
