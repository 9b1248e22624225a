//! PAM adapter for nonstick.
//!
//! [`PamEngine`] drives one PAM transaction per call through the host's PAM
//! stack, relaying every conversation request to a
//! [`nonstick_core::Conversation`]. Linking against libpam is gated behind the
//! `libpam` feature; without it the engine reports a start failure for every
//! transaction.

pub mod config;
pub mod conversation;
pub mod engine;

pub use config::PamConfig;
pub use conversation::ConversationRelay;
pub use engine::PamEngine;

/// Whether this build can run real PAM transactions.
pub const PAM_LINKED: bool = cfg!(feature = "libpam");
