//! WebSocket bridge for PAM conversations.
//!
//! A [`PamSocket`] runs one authentication transaction per connection. The
//! engine's prompts are written to the browser as [`ServerMessage`] frames
//! and each prompt blocks until the browser answers with a
//! [`ClientMessage`](nonstick_core::ClientMessage). On success the login flow
//! is told who authenticated and its redirect is sent as the final frame.
//!
//! [`ServerMessage`]: nonstick_core::ServerMessage

pub mod config;
pub mod error;
pub mod session;
pub mod socket;


pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use session::{SocketConversation, decode_frame, encode_frame};
pub use socket::{AUTHENTICATION_FAILED, INTERNAL_ERROR, PamSocket, SessionOutcome};
