use std::time::Duration;

use thiserror::Error;

use crate::domain::id::RegionId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to render config: {0}")]
    Serialize(#[source] toml::ser::Error),
}

/// Failure of a single remote call, classified by what the remote signalled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote refused the call because the caller exceeded its quota.
    #[error("throttled by remote (status {status})")]
    Throttled { status: u16 },

    #[error("remote returned status {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// HTTP 420 is the ESI error-limit response; 429 is standard throttling.
const THROTTLE_STATUSES: [u16; 2] = [420, 429];

impl RemoteError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if THROTTLE_STATUSES.contains(&status) {
            Self::Throttled { status }
        } else {
            Self::Status { status }
        }
    }

    /// Status code carried by the error, if the remote answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Throttled { status } | Self::Status { status } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// True when the failure is worth retrying after a backoff.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16());
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

/// The caller's cancellation fired before the operation completed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Outcome of one rate-limited remote call attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Terminal result of a retried call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    #[error("cancelled while retrying")]
    Cancelled,

    #[error("non-retryable failure: {0}")]
    Fatal(#[source] RemoteError),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: RemoteError,
    },
}

impl RetryError {
    /// The underlying remote failure, if any.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Cancelled => None,
            Self::Fatal(err) | Self::Exhausted { last: err, .. } => Some(err),
        }
    }
}

/// Fetch-level failure: the whole multi-page fetch is discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("first-page fetch failed for region {region}: {source}")]
    FirstPage {
        region: RegionId,
        #[source]
        source: RetryError,
    },

    #[error("page {page} fetch failed for region {region}: {source}")]
    Worker {
        region: RegionId,
        page: u32,
        #[source]
        source: RetryError,
    },

    #[error("region {region} reports {reported} pages, more than the limit of {limit}")]
    TooManyPages {
        region: RegionId,
        reported: u32,
        limit: u32,
    },

    #[error("fetch for region {region} ended with {missing} pages unaccounted for")]
    Incomplete { region: RegionId, missing: u32 },

    #[error("fetch for region {region} cancelled")]
    Cancelled { region: RegionId },

    #[error("fetch for region {region} exceeded deadline of {timeout:?}")]
    DeadlineExceeded { region: RegionId, timeout: Duration },
}

impl FetchError {
    /// True for caller cancellation or deadline expiry, false for remote failures.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }
}

/// Cache backend or payload errors. Never surfaced to read-path callers.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("failed to encode cache payload: {0}")]
    Encode(String),

    #[error("failed to decode cache payload: {0}")]
    Decode(String),
}

/// Persisted store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store query error: {0}")]
    Query(String),

    #[error("corrupt stored row: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
