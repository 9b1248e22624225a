//! The login/consent flow capability.

use crate::consent::ConsentInfo;
use crate::error::FlowResult;
use async_trait::async_trait;
use url::form_urlencoded;

/// The parts of an HTTP request a login flow reads.
///
/// Query and form parameters are kept as ordered pairs so repeated keys stay
/// visible to the flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowRequest {
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
}

impl FlowRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from a raw, urlencoded query string.
    pub fn from_query(raw: Option<&str>) -> Self {
        Self {
            query: parse_pairs(raw.unwrap_or_default().as_bytes()),
            form: Vec::new(),
        }
    }

    /// Attach a urlencoded form body.
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.form = parse_pairs(body);
        self
    }

    pub fn with_query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_form_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value posted for a form field, in order.
    pub fn form_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.form
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn form_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.form.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Hooks called around the interactive login and consent steps.
#[async_trait]
pub trait LoginFlow: Send + Sync {
    /// Called before credentials are collected. `Some(url)` means the caller
    /// is already recognised and must be sent to `url` without authenticating.
    async fn pre_login(&self, request: &FlowRequest) -> FlowResult<Option<String>>;

    /// Called exactly once after successful authentication. `subject` is a
    /// stable identifier (the numeric account id), never a display name.
    /// Returns the URL to send the browser to.
    async fn authenticated(&self, request: &FlowRequest, subject: &str) -> FlowResult<String>;

    /// Decide whether a consent screen is needed and what it shows.
    async fn request_consent(&self, request: &FlowRequest) -> FlowResult<ConsentInfo>;

    /// Apply the user's consent decision and return the URL to send the
    /// browser to.
    async fn accept_consent(&self, request: &FlowRequest) -> FlowResult<String>;

    /// Whether the HTTP layer should expose OpenID Connect client routes.
    fn supports_oidc(&self) -> bool;
}

/// A flow that talks to no authorization server, for testing the login page
/// and socket end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFlow;

#[async_trait]
impl LoginFlow for NoopFlow {
    async fn pre_login(&self, _request: &FlowRequest) -> FlowResult<Option<String>> {
        Ok(None)
    }

    async fn authenticated(&self, _request: &FlowRequest, _subject: &str) -> FlowResult<String> {
        Ok("/authenticated".to_string())
    }

    async fn request_consent(&self, _request: &FlowRequest) -> FlowResult<ConsentInfo> {
        Ok(ConsentInfo::redirect("/consented"))
    }

    async fn accept_consent(&self, _request: &FlowRequest) -> FlowResult<String> {
        Ok("/accept".to_string())
    }

    fn supports_oidc(&self) -> bool {
        false
    }
}
