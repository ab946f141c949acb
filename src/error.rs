//! Error types for backend calls.
//!
//! Only transport and server failures are errors. Precondition violations
//! (no file chosen, empty query, call already in flight) are reported as
//! outcomes by the components that guard them.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, timeout, TLS failure and similar.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("invalid response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    /// Reading a local file for upload failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// The endpoint path the failed request targeted, if any.
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            ClientError::Transport { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. } => Some(endpoint),
            ClientError::Io { .. } => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
