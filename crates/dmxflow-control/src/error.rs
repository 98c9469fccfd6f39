//! Error types for the transmission engine
use std::net::SocketAddr;
use thiserror::Error;

use dmxflow_core::CoreError;

/// Engine errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Rejected channel write, placement or address
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// UDP send failure for one destination
    #[error("Send to {destination} failed: {source}")]
    Transport {
        /// Datagram destination
        destination: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration or a socket that cannot be bound
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP API error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControlError {
    /// Whether the error came from synchronous input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(e) if e.is_validation())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ControlError>;
