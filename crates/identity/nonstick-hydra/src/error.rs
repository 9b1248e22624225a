//! Hydra client error types.

use nonstick_core::FlowError;
use thiserror::Error;

pub type HydraResult<T> = Result<T, HydraError>;

#[derive(Debug, Error)]
pub enum HydraError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("{operation} returned {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid {operation} response: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}

impl From<HydraError> for FlowError {
    fn from(error: HydraError) -> Self {
        FlowError::provider(error)
    }
}
