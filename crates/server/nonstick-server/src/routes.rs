//! HTTP routes: the login shell, the PAM socket and the consent pages.

use crate::error::AppError;
use crate::pages::Pages;
use axum::body::Bytes;
use axum::extract::{RawQuery, State, WebSocketUpgrade};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use nonstick_core::{FlowRequest, LoginFlow};
use nonstick_pamsocket::PamSocket;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<dyn LoginFlow>,
    pub socket: PamSocket,
    pub pages: Arc<Pages>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/login") }))
        .route("/login", get(login))
        .route("/consent", get(consent_form).post(consent_submit))
        .route("/api/pamws", get(pam_socket))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

pub async fn login(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = FlowRequest::from_query(query.as_deref());
    match state.flow.pre_login(&request).await? {
        Some(redirect) => {
            debug!("Login already known, redirecting");
            Ok(Redirect::temporary(&redirect).into_response())
        }
        None => Ok(Html(state.pages.login(query.as_deref())?).into_response()),
    }
}

pub async fn pam_socket(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    upgrade: WebSocketUpgrade,
) -> Response {
    let request = FlowRequest::from_query(query.as_deref());
    state.socket.upgrade(upgrade, request)
}

pub async fn consent_form(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = FlowRequest::from_query(query.as_deref());
    let info = state.flow.request_consent(&request).await?;
    if let Some(redirect) = info.redirect_target() {
        debug!("Consent remembered, redirecting");
        return Ok(Redirect::temporary(redirect).into_response());
    }
    Ok(Html(state.pages.consent(&info, query.as_deref())?).into_response())
}

pub async fn consent_submit(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = FlowRequest::from_query(query.as_deref()).with_form_body(&body);
    let redirect = state.flow.accept_consent(&request).await?;
    Ok(Redirect::to(&redirect).into_response())
}
