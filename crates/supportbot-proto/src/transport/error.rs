//! Transport error types.

use thiserror::Error;

use crate::error::ProtocolError;

/// Errors that can occur when reading from a transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportReadError {
    /// The socket failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent something that is not an IRC line.
    #[error("transport protocol error: {0}")]
    Protocol(ProtocolError),
}

impl From<ProtocolError> for TransportReadError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(io) => TransportReadError::Io(io),
            other => TransportReadError::Protocol(other),
        }
    }
}

impl TransportReadError {
    /// Whether the socket itself failed, as opposed to the peer misbehaving.
    pub fn is_network(&self) -> bool {
        matches!(self, TransportReadError::Io(_))
    }
}
