//! Login flow error types.

use crate::accounts::LookupError;
use http::StatusCode;
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    /// A call to the authorization server's administrative API failed.
    #[error("authorization server request failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("missing consent decision")]
    MissingConsentDecision,

    #[error("unknown consent decision")]
    UnknownConsentDecision,

    #[error("missing {0} parameter")]
    MissingChallenge(&'static str),

    #[error("unable to determine OAuth2 client")]
    MissingClient,

    #[error("identity lookup failed: {0}")]
    IdentityLookup(#[from] LookupError),
}

impl FlowError {
    pub fn provider(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FlowError::Provider(error.into())
    }

    /// HTTP status used when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            FlowError::MissingConsentDecision
            | FlowError::UnknownConsentDecision
            | FlowError::MissingChallenge(_) => StatusCode::BAD_REQUEST,
            FlowError::Provider(_) | FlowError::MissingClient => StatusCode::BAD_GATEWAY,
            FlowError::IdentityLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
