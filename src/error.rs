//! Error types for the hex copy service.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hex copy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hex copy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A session is already active; retry after it is released.
    #[error("Device busy: a session is already active")]
    Busy,

    /// Boundary copy from the caller buffer did not complete.
    #[error("Boundary copy incomplete: requested {requested} bytes, copied {copied} bytes")]
    Copy { requested: usize, copied: usize },

    /// Write count exceeds the configured maximum.
    #[error("Write of {requested} bytes exceeds maximum of {max} bytes")]
    CapacityExceeded { requested: usize, max: usize },

    /// The persistent sink could not be opened.
    #[error("Sink unavailable at {path}: {source}")]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink accepted fewer bytes than a record holds.
    #[error("Sink write shortfall: expected {expected} bytes, wrote {written} bytes")]
    SinkWriteShortfall { expected: usize, written: usize },

    /// I/O error outside of sink acquisition.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid service configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
