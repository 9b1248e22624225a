//! JSON frames exchanged over the authentication socket.
//!
//! The client only ever answers prompts, so it has a single frame shape. The
//! server tags each frame with a [`MessageType`] that tells the client whether
//! a reply is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A frame sent by the browser in reply to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    /// The text the user typed.
    #[serde(alias = "Input")]
    pub input: String,
}

impl ClientMessage {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Kind of a server frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Request hidden input, such as a password or one-time code.
    PromptEchoOff,
    /// Request visible input, such as a user name.
    PromptEchoOn,
    /// An error to display.
    Error,
    /// Informational text to display.
    Info,
    /// A URL the browser must navigate to next.
    Redirect,
}

impl MessageType {
    /// Whether the client must answer a frame of this type with exactly one
    /// [`ClientMessage`].
    pub fn expects_reply(self) -> bool {
        matches!(self, MessageType::PromptEchoOff | MessageType::PromptEchoOn)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::PromptEchoOff => "PromptEchoOff",
            MessageType::PromptEchoOn => "PromptEchoOn",
            MessageType::Error => "Error",
            MessageType::Info => "Info",
            MessageType::Redirect => "Redirect",
        };
        f.write_str(name)
    }
}

/// A frame sent by the server to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub message: String,
}

impl ServerMessage {
    pub fn new(kind: MessageType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(MessageType::Info, message)
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Self::new(MessageType::Redirect, url)
    }

    pub fn expects_reply(&self) -> bool {
        self.kind.expects_reply()
    }
}
