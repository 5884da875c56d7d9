use thiserror::Error;

use crate::codec::CodecError;

/// Main error type for the EventSub client.
///
/// Variants double as failure-phase markers: callers classify by matching
/// on the variant, never by inspecting the message text.
#[derive(Error, Debug)]
pub enum ClientError {
    /// `connect` was called while the client was already active.
    #[error("client already in use")]
    AlreadyInUse,

    /// `close` was called while the client was not active.
    #[error("client is not connected")]
    NotConnected,

    /// Dialing the WebSocket endpoint failed.
    #[error("failed to set up connection: {0}")]
    ConnectionFailed(String),

    /// A frame read failed or timed out.
    #[error("read error: {0}")]
    Read(String),

    /// A frame arrived but its envelope could not be decoded.
    #[error("failed to unmarshal message: {0}")]
    Unmarshal(#[source] CodecError),

    /// A frame handler rejected an otherwise well-formed frame.
    #[error("handling error: {0}")]
    Handling(#[source] CodecError),

    /// No liveness signal inside the negotiated keepalive window.
    #[error("connection is not alive")]
    ConnectionNotAlive,

    /// The reconnect handshake did not produce a welcome in time.
    #[error("reconnect awaiting timeout")]
    ReconnectTimeout,

    /// An operation was cut short by scope cancellation.
    #[error("operation cancelled")]
    Cancelled,

    /// A spawned task could not be joined.
    #[error("task failed: {0}")]
    Task(String),
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// True when the failure was a notification whose `(type, version)`
    /// pair has no registry decoder.
    pub fn is_unsupported_event(&self) -> bool {
        matches!(
            self,
            ClientError::Handling(CodecError::UnsupportedEvent { .. })
                | ClientError::Unmarshal(CodecError::UnsupportedEvent { .. })
        )
    }
}
