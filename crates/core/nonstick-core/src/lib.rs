//! Core types for the nonstick PAM identity provider.
//!
//! This crate defines the pieces shared by every other nonstick crate:
//!
//! - the JSON frames exchanged over the authentication socket ([`wire`])
//! - the login/consent flow capability and its no-op implementation ([`flow`])
//! - scope presentation and consent form decisions ([`consent`])
//! - the contract of a blocking, conversation-driven authentication engine ([`engine`])
//! - lookup of host accounts by login name or subject ([`accounts`])

pub mod accounts;
pub mod consent;
pub mod engine;
pub mod error;
pub mod flow;
pub mod wire;

pub use accounts::{Account, AccountDirectory, LookupError, StaticAccounts};
#[cfg(unix)]
pub use accounts::SystemAccounts;
pub use consent::{ConsentDecision, ConsentInfo, Scope, describe_scope, describe_scopes};
pub use engine::{AuthEngine, Conversation, ConversationError, EngineError, EngineResult, Style};
pub use error::{FlowError, FlowResult};
pub use flow::{FlowRequest, LoginFlow, NoopFlow};
pub use wire::{ClientMessage, MessageType, ServerMessage};
