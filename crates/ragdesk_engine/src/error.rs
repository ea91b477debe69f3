use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Normalized failure of one backend call. Displays as its message only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: RequestErrorKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// No response was received.
    Transport,
    /// The backend answered with a non-success status.
    Backend { status: u16 },
    /// A success body was not the JSON the caller expected.
    Decode,
    /// The request could not be built (bad URL or body).
    InvalidRequest,
}

impl fmt::Display for RequestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestErrorKind::Transport => write!(f, "transport error"),
            RequestErrorKind::Backend { status } => write!(f, "backend status {status}"),
            RequestErrorKind::Decode => write!(f, "decode error"),
            RequestErrorKind::InvalidRequest => write!(f, "invalid request"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Request(#[from] RequestError),
}
