use thiserror::Error;

/// Errors raised by the fallible helpers around classification.
///
/// Classification itself never fails; these surface from payload parsing,
/// invariant checks, status decoding and configuration loading.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("malformed sync error payload: {0}")]
    MalformedSyncError(String),

    #[error("invariant violation: {invariant}: {message}")]
    InvariantViolation { invariant: String, message: String },

    #[error("unknown assertion status: {0}")]
    UnknownStatus(String),

    #[error("unknown assertion status code: {0}")]
    UnknownStatusCode(u8),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatusError {
    pub(crate) fn invariant(invariant: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            invariant: invariant.into(),
            message: message.into(),
        }
    }
}

/// Result alias for fallible status helpers.
pub type StatusResult<T> = Result<T, StatusError>;
