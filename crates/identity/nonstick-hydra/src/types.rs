//! Hydra administrative API payloads.

use serde::{Deserialize, Deserializer, Serialize};

/// Hydra sends `null` for empty lists on some versions.
fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The OAuth2 client a login or consent request was made for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuth2Client {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
}

impl OAuth2Client {
    /// Human-readable name, falling back to the client id.
    pub fn display_name(&self) -> &str {
        if self.client_name.is_empty() {
            &self.client_id
        } else {
            &self.client_name
        }
    }
}

/// A pending login request, fetched by `login_challenge`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub challenge: String,
    /// Hydra already knows who the user is.
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub client: Option<OAuth2Client>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub requested_scope: Vec<String>,
}

/// A pending consent request, fetched by `consent_challenge`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsentRequest {
    #[serde(default)]
    pub challenge: String,
    /// The user already granted these scopes and asked to be remembered.
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub client: Option<OAuth2Client>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub requested_scope: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub requested_access_token_audience: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptLoginRequest {
    pub subject: String,
    pub remember: bool,
    pub remember_for: i64,
}

/// Claims placed into the ID token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub preferred_username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSession {
    pub id_token: IdTokenClaims,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptConsentRequest {
    pub grant_scope: Vec<String>,
    pub grant_access_token_audience: Vec<String>,
    pub remember: bool,
    pub remember_for: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<ConsentSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub error: String,
    pub error_description: String,
}

impl RejectRequest {
    pub fn access_denied() -> Self {
        Self {
            error: "access_denied".to_string(),
            error_description: "The resource owner denied the request".to_string(),
        }
    }
}

/// Response to any accept or reject call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRequest {
    pub redirect_to: String,
}
