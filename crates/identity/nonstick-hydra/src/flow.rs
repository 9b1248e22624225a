//! Login flow implementation driving Hydra's login and consent requests.

use crate::client::AdminClient;
use crate::config::HydraConfig;
use crate::error::HydraResult;
use crate::types::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentRequest, ConsentSession, IdTokenClaims,
    RejectRequest,
};
use async_trait::async_trait;
use nonstick_core::{
    AccountDirectory, ConsentDecision, ConsentInfo, FlowError, FlowRequest, FlowResult, LoginFlow,
    describe_scopes,
};
use std::sync::Arc;
use tracing::{debug, info};

const LOGIN_CHALLENGE: &str = "login_challenge";
const CONSENT_CHALLENGE: &str = "consent_challenge";

/// [`LoginFlow`] that completes Hydra login and consent requests.
#[derive(Clone)]
pub struct HydraFlow {
    client: AdminClient,
    accounts: Arc<dyn AccountDirectory>,
    login_remember_for: i64,
    consent_remember_for: i64,
}

impl HydraFlow {
    pub fn new(config: &HydraConfig, accounts: Arc<dyn AccountDirectory>) -> HydraResult<Self> {
        Ok(Self {
            client: AdminClient::new(config)?,
            accounts,
            login_remember_for: config.login_remember_for_seconds,
            consent_remember_for: config.consent_remember_for_seconds,
        })
    }

    fn challenge<'a>(request: &'a FlowRequest, name: &'static str) -> FlowResult<&'a str> {
        request
            .query(name)
            .filter(|challenge| !challenge.is_empty())
            .ok_or(FlowError::MissingChallenge(name))
    }

    fn accept_login(&self, subject: &str) -> AcceptLoginRequest {
        AcceptLoginRequest {
            subject: subject.to_string(),
            remember: true,
            remember_for: self.login_remember_for,
        }
    }

    /// Identity claims for `subject`, taken from its host account.
    fn identity_session(&self, subject: &str) -> FlowResult<ConsentSession> {
        let account = self.accounts.by_subject(subject)?;
        let (given_name, family_name) = match account.name_parts() {
            Some((given, family)) => (Some(given.to_string()), Some(family.to_string())),
            None => (None, None),
        };
        Ok(ConsentSession {
            id_token: IdTokenClaims {
                given_name,
                family_name,
                preferred_username: account.login,
            },
        })
    }

    fn accept_consent_body(
        &self,
        consent: &ConsentRequest,
        grant_scope: Vec<String>,
    ) -> FlowResult<AcceptConsentRequest> {
        let session = if grant_scope.iter().any(|scope| scope == "profile") {
            Some(self.identity_session(&consent.subject)?)
        } else {
            None
        };
        Ok(AcceptConsentRequest {
            grant_scope,
            grant_access_token_audience: consent.requested_access_token_audience.clone(),
            remember: true,
            remember_for: self.consent_remember_for,
            session,
        })
    }
}

#[async_trait]
impl LoginFlow for HydraFlow {
    async fn pre_login(&self, request: &FlowRequest) -> FlowResult<Option<String>> {
        let challenge = Self::challenge(request, LOGIN_CHALLENGE)?;
        let login = self.client.get_login_request(challenge).await?;

        if !login.skip {
            debug!("Login request requires authentication");
            return Ok(None);
        }

        info!("Hydra already knows subject {}, skipping login", login.subject);
        let completed = self
            .client
            .accept_login_request(challenge, &self.accept_login(&login.subject))
            .await?;
        Ok(Some(completed.redirect_to))
    }

    async fn authenticated(&self, request: &FlowRequest, subject: &str) -> FlowResult<String> {
        let challenge = Self::challenge(request, LOGIN_CHALLENGE)?;
        let completed = self
            .client
            .accept_login_request(challenge, &self.accept_login(subject))
            .await?;
        info!("Accepted login for subject {}", subject);
        Ok(completed.redirect_to)
    }

    async fn request_consent(&self, request: &FlowRequest) -> FlowResult<ConsentInfo> {
        let challenge = Self::challenge(request, CONSENT_CHALLENGE)?;
        let consent = self.client.get_consent_request(challenge).await?;
        debug!(
            "Consent request for subject {} (skip={}, scopes={:?})",
            consent.subject, consent.skip, consent.requested_scope
        );

        if consent.skip {
            let body = self.accept_consent_body(&consent, consent.requested_scope.clone())?;
            let completed = self.client.accept_consent_request(challenge, &body).await?;
            info!("Consent for subject {} remembered, skipping", consent.subject);
            return Ok(ConsentInfo::redirect(completed.redirect_to));
        }

        let client = consent.client.as_ref().ok_or(FlowError::MissingClient)?;
        Ok(ConsentInfo::interactive(
            client.display_name(),
            describe_scopes(&consent.requested_scope),
        ))
    }

    async fn accept_consent(&self, request: &FlowRequest) -> FlowResult<String> {
        let decision = ConsentDecision::from_request(request)?;
        let challenge = Self::challenge(request, CONSENT_CHALLENGE)?;

        let completed = match decision {
            ConsentDecision::Deny => {
                info!("Consent denied");
                self.client
                    .reject_consent_request(challenge, &RejectRequest::access_denied())
                    .await?
            }
            ConsentDecision::Accept { granted } => {
                let consent = self.client.get_consent_request(challenge).await?;
                info!(
                    "Consent granted by subject {} for {:?}",
                    consent.subject, granted
                );
                let body = self.accept_consent_body(&consent, granted)?;
                self.client.accept_consent_request(challenge, &body).await?
            }
        };
        Ok(completed.redirect_to)
    }

    fn supports_oidc(&self) -> bool {
        true
    }
}
