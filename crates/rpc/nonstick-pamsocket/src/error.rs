//! Bridge error types.

use nonstick_core::ConversationError;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed client frame: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("client frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("binary client frame is not valid UTF-8")]
    NonUtf8Frame,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out waiting for a client reply")]
    ReplyTimeout,

    #[error("transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    /// Whether the client sent something the bridge cannot accept.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            BridgeError::Protocol(_) | BridgeError::FrameTooLarge { .. } | BridgeError::NonUtf8Frame
        )
    }
}

impl From<BridgeError> for ConversationError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::ConnectionClosed => ConversationError::Closed,
            BridgeError::ReplyTimeout => ConversationError::TimedOut,
            other => ConversationError::Delivery(other.to_string()),
        }
    }
}
