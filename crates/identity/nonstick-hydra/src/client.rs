//! Client for Hydra's administrative login and consent endpoints.

use crate::config::HydraConfig;
use crate::error::{HydraError, HydraResult};
use crate::types::{
    AcceptConsentRequest, AcceptLoginRequest, CompletedRequest, ConsentRequest, LoginRequest,
    RejectRequest,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

const LOGIN_PATH: &str = "admin/oauth2/auth/requests/login";
const LOGIN_ACCEPT_PATH: &str = "admin/oauth2/auth/requests/login/accept";
const CONSENT_PATH: &str = "admin/oauth2/auth/requests/consent";
const CONSENT_ACCEPT_PATH: &str = "admin/oauth2/auth/requests/consent/accept";
const CONSENT_REJECT_PATH: &str = "admin/oauth2/auth/requests/consent/reject";

/// Hydra administrative API client.
///
/// Constructed once at startup and shared read-only; calls are not retried.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http_client: Client,
    base_url: Url,
}

impl AdminClient {
    pub fn new(config: &HydraConfig) -> HydraResult<Self> {
        let mut builder = Client::builder();
        // Zero leaves administrative calls unbounded.
        if config.http_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.http_timeout_seconds));
        }
        let http_client = builder.build()?;

        let mut base_url = Url::parse(&config.admin_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, path: &str, challenge_param: &str, challenge: &str) -> HydraResult<Url> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair(challenge_param, challenge);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> HydraResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} failed with {}: {}", operation, status, body);
            return Err(HydraError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json()
            .await
            .map_err(|e| HydraError::InvalidResponse {
                operation,
                message: e.to_string(),
            })?;
        debug!("{} succeeded", operation);
        Ok(parsed)
    }

    pub async fn get_login_request(&self, challenge: &str) -> HydraResult<LoginRequest> {
        let url = self.endpoint(LOGIN_PATH, "login_challenge", challenge)?;
        self.send(self.http_client.get(url), "get login request")
            .await
    }

    pub async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> HydraResult<CompletedRequest> {
        let url = self.endpoint(LOGIN_ACCEPT_PATH, "login_challenge", challenge)?;
        self.send(self.http_client.put(url).json(body), "accept login request")
            .await
    }

    pub async fn get_consent_request(&self, challenge: &str) -> HydraResult<ConsentRequest> {
        let url = self.endpoint(CONSENT_PATH, "consent_challenge", challenge)?;
        self.send(self.http_client.get(url), "get consent request")
            .await
    }

    pub async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> HydraResult<CompletedRequest> {
        let url = self.endpoint(CONSENT_ACCEPT_PATH, "consent_challenge", challenge)?;
        self.send(self.http_client.put(url).json(body), "accept consent request")
            .await
    }

    pub async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> HydraResult<CompletedRequest> {
        let url = self.endpoint(CONSENT_REJECT_PATH, "consent_challenge", challenge)?;
        self.send(self.http_client.put(url).json(body), "reject consent request")
            .await
    }
}
