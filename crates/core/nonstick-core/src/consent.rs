//! Scope presentation and consent decisions.

use crate::error::{FlowError, FlowResult};
use crate::flow::FlowRequest;
use serde::{Deserialize, Serialize};

/// Prefix of the consent form fields that carry per-scope checkboxes.
pub const SCOPE_FIELD_PREFIX: &str = "scope.";

/// Name of the consent form field that carries the user's decision.
pub const CONSENT_FIELD: &str = "consent";

/// A single OAuth2 scope as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub description: String,
    /// Granted implicitly, without a visible checkbox.
    pub hidden: bool,
}

impl Scope {
    /// The consent form field that toggles this scope.
    pub fn field_name(&self) -> String {
        format!("{SCOPE_FIELD_PREFIX}{}", self.name)
    }
}

/// Map a requested scope to its presentation.
pub fn describe_scope(name: &str) -> Scope {
    let (description, hidden) = match name {
        "openid" => (String::new(), true),
        "profile" => ("Access your first and last name".to_string(), false),
        "email" => ("Access your email address".to_string(), false),
        other => (
            format!("(no detailed description) access to '{other}'"),
            false,
        ),
    };
    Scope {
        name: name.to_string(),
        description,
        hidden,
    }
}

/// Map requested scopes to their presentation, preserving order.
pub fn describe_scopes<S: AsRef<str>>(names: &[S]) -> Vec<Scope> {
    names.iter().map(|name| describe_scope(name.as_ref())).collect()
}

/// What the consent step needs from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentInfo {
    /// When set, no consent screen is needed and the browser must be sent here.
    pub redirect: Option<String>,
    /// Human-readable name of the client application.
    pub target: String,
    pub scopes: Vec<Scope>,
}

impl ConsentInfo {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            redirect: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn interactive(target: impl Into<String>, scopes: Vec<Scope>) -> Self {
        Self {
            redirect: None,
            target: target.into(),
            scopes,
        }
    }

    /// The redirect target, if the consent screen can be skipped.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_deref().filter(|url| !url.is_empty())
    }
}

/// The user's answer on the consent form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentDecision {
    /// Grant exactly these scopes, in form order.
    Accept { granted: Vec<String> },
    Deny,
}

impl ConsentDecision {
    /// Parse the posted consent form.
    ///
    /// Every `scope.<name>` field whose value is exactly `on` is granted. The
    /// `consent` field must appear exactly once with value `Accept` or `Deny`.
    pub fn from_request(request: &FlowRequest) -> FlowResult<Self> {
        let mut decisions = request.form_values(CONSENT_FIELD);
        let decision = match (decisions.next(), decisions.next()) {
            (Some(decision), None) => decision,
            _ => return Err(FlowError::MissingConsentDecision),
        };

        match decision {
            "Deny" => Ok(ConsentDecision::Deny),
            "Accept" => Ok(ConsentDecision::Accept {
                granted: granted_scopes(request),
            }),
            _ => Err(FlowError::UnknownConsentDecision),
        }
    }
}

fn granted_scopes(request: &FlowRequest) -> Vec<String> {
    let mut granted: Vec<String> = Vec::new();
    for (key, value) in request.form_pairs() {
        let Some(scope) = key.strip_prefix(SCOPE_FIELD_PREFIX).filter(|s| !s.is_empty()) else {
            continue;
        };
        if value == "on" && !granted.iter().any(|g| g == scope) {
            granted.push(scope.to_string());
        }
    }
    granted
}
