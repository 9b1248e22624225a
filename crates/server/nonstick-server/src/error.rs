use crate::pages;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::RenderError;
use nonstick_core::FlowError;
use tracing::{error, warn};

/// A failed page request. The client sees a generic page; the cause is logged.
#[derive(Debug)]
pub enum AppError {
    Flow(FlowError),
    Render(RenderError),
}

impl From<FlowError> for AppError {
    fn from(error: FlowError) -> Self {
        AppError::Flow(error)
    }
}

impl From<RenderError> for AppError {
    fn from(error: RenderError) -> Self {
        AppError::Render(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Flow(e) => e.status_code(),
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match &self {
            AppError::Flow(e) if !status.is_server_error() => warn!("Rejected request: {}", e),
            AppError::Flow(e) => error!("Request failed: {}", e),
            AppError::Render(e) => error!("Failed to render page: {}", e),
        }
        (status, Html(pages::error_page(status))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_error() {
        let response = AppError::from(FlowError::MissingConsentDecision).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(FlowError::provider("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_render_failure_is_internal() {
        let error = handlebars::Handlebars::new()
            .render("missing", &())
            .unwrap_err();
        let response = AppError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
