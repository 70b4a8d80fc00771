use std::io;
use std::result;
use std::str::Utf8Error;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

use crate::types::CInt;

pub type Result<T> = result::Result<T, Error>;

/// Shared error type for the driver. Requests can fail synchronously while
/// being encoded, in transit on a connection, or on the server itself; the
/// session additionally reports queue and lifecycle failures through the same
/// type so callers handle a single taxonomy.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Internal IO error, as raised by a connection.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// General error.
    #[error("General error: {0}")]
    General(String),
    /// The codec rejected a request. Never retried.
    #[error("Encode error: {0}")]
    Encode(String),
    /// Internal error that may be raised during `String::from_utf8`.
    #[error("FromUtf8 error: {0}")]
    FromUtf8(#[from] FromUtf8Error),
    /// Internal error that may be raised during `str::from_utf8`.
    #[error("Utf8 error: {0}")]
    Utf8(#[from] Utf8Error),
    /// Protocol-level error reply from the server. Surfaced to the caller;
    /// not retried by the default policy.
    #[error("Server error {code:#06x}: {message}")]
    Server { code: CInt, message: String },
    /// Timed out waiting for an operation to complete.
    #[error("Timeout: {0}")]
    Timeout(String),
    /// The session's request queue is bounded and full.
    #[error("No connections available and the request queue is full!")]
    NoConnectionsAvailable,
    /// The cluster handle has been lost; the session is terminating.
    #[error("Cluster handle is gone!")]
    ClusterGone,
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::General(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::General(err.to_string())
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::Io(error) => Error::Io(io::Error::new(
                error.kind(),
                error
                    .get_ref()
                    .map(|error| error.to_string())
                    .unwrap_or_default(),
            )),
            Error::General(message) => Error::General(message.clone()),
            Error::Encode(message) => Error::Encode(message.clone()),
            Error::FromUtf8(error) => Error::FromUtf8(error.clone()),
            Error::Utf8(error) => Error::Utf8(*error),
            Error::Server { code, message } => Error::Server {
                code: *code,
                message: message.clone(),
            },
            Error::Timeout(message) => Error::Timeout(message.clone()),
            Error::NoConnectionsAvailable => Error::NoConnectionsAvailable,
            Error::ClusterGone => Error::ClusterGone,
        }
    }
}
