use reqwest::StatusCode;
use thiserror::Error;

/// Why a single GET attempt failed
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
}

impl FetchCause {
    /// Timeouts, dropped connections, 5xx, 408 and 429 are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchCause::Status(status) => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchCause::Transport(err) => !(err.is_builder() || err.is_redirect() || err.is_decode()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid listing url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url} after {attempts} attempt(s): {cause}")]
    Failed {
        url: String,
        attempts: u32,
        #[source]
        cause: FetchCause,
    },
}

impl FetchError {
    /// Number of GET attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            FetchError::Failed { attempts, .. } => *attempts,
            _ => 0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("listing page is empty")]
    Empty,
    #[error("listing page contains no markup")]
    Unstructured,
    #[error("document does not look like a listing page")]
    NotAListing,
}

#[derive(Debug, Error)]
#[error("malformed {record} payload: {source}")]
pub struct SchemaError {
    pub record: &'static str,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, Error>;
