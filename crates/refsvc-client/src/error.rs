use refsvc_protocol::ProtocolError;
use refsvc_transport::TransportError;
use refsvc_types::TypeError;
use thiserror::Error;

/// Errors surfaced by [`RefClient`](crate::RefClient) operations.
///
/// Nothing is retried or recovered inside the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed caller input: a bad sort key (detected before any call) or a
    /// ref name the backend rejected as invalid.
    #[error("{0}")]
    InvalidArgument(String),

    /// The backend refused a ref mutation.
    #[error("{0}")]
    InvalidRef(String),

    /// The round trip failed. Carries the transport error unchanged.
    #[error("backend unavailable: {0}")]
    Backend(#[from] TransportError),

    /// Client and backend disagree on the protocol. Not recoverable by
    /// retrying.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(#[from] ProtocolError),
}

impl ClientError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProtocolMismatch(_))
    }
}

impl From<TypeError> for ClientError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
