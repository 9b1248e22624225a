//! Login flow backed by the Ory Hydra administrative API.
//!
//! Hydra hands the identity provider opaque `login_challenge` and
//! `consent_challenge` tokens. All flow state lives in Hydra; this crate only
//! fetches the pending requests those tokens name and accepts or rejects them.

mod client;
mod config;
mod error;
mod flow;
mod types;

#[cfg(test)]
mod tests;

pub use client::AdminClient;
pub use config::HydraConfig;
pub use error::{HydraError, HydraResult};
pub use flow::HydraFlow;
pub use types::{
    AcceptConsentRequest, AcceptLoginRequest, CompletedRequest, ConsentRequest, ConsentSession,
    IdTokenClaims, LoginRequest, OAuth2Client, RejectRequest,
};

// Re-export common types for convenience
pub use nonstick_core::{FlowError, LoginFlow};
