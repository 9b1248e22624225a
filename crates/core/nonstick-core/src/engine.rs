//! Contract of the host authentication engine.
//!
//! The engine is synchronous and transactional: a single call to
//! [`AuthEngine::authenticate`] drives the whole exchange, invoking the
//! supplied [`Conversation`] zero or more times, one request at a time, and
//! blocking the calling thread while it waits for each answer.

use crate::wire::MessageType;
use thiserror::Error;

/// How the engine wants a message rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    PromptEchoOff,
    PromptEchoOn,
    ErrorMsg,
    TextInfo,
}

impl Style {
    /// The wire frame type used to present this style to the client.
    pub fn message_type(self) -> MessageType {
        match self {
            Style::PromptEchoOff => MessageType::PromptEchoOff,
            Style::PromptEchoOn => MessageType::PromptEchoOn,
            Style::ErrorMsg => MessageType::Error,
            Style::TextInfo => MessageType::Info,
        }
    }

    pub fn expects_reply(self) -> bool {
        self.message_type().expects_reply()
    }
}

/// Errors a conversation can report back to the engine.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("connection closed before a reply arrived")]
    Closed,

    #[error("timed out waiting for a reply")]
    TimedOut,

    #[error("failed to deliver message: {0}")]
    Delivery(String),
}

/// Callback through which the engine talks to the user.
///
/// Implementations are called from the engine's thread and may block.
pub trait Conversation: Send {
    /// Present `message` in the given style.
    ///
    /// Prompt styles return `Ok(Some(answer))`; display-only styles return
    /// `Ok(None)` without waiting.
    fn respond(&mut self, style: Style, message: &str) -> Result<Option<String>, ConversationError>;
}

/// Failures of an authentication transaction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not be initialised for this transaction.
    #[error("failed to start authentication engine: {0}")]
    Start(String),

    /// The credentials were rejected or the conversation was abandoned.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The engine succeeded but could not report who was authenticated.
    #[error("failed to read authenticated user: {0}")]
    Item(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A blocking authentication engine.
pub trait AuthEngine: Send + Sync + 'static {
    /// Run one authentication transaction to completion and return the login
    /// name of the authenticated user.
    fn authenticate(&self, conversation: Box<dyn Conversation>) -> EngineResult<String>;
}
