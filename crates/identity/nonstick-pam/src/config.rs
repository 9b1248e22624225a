use serde::{Deserialize, Serialize};

/// Service used when none is configured.
pub const DEFAULT_SERVICE: &str = "google-authenticator";

/// Which PAM service stack to run.
///
/// The service is looked up in the system PAM configuration directory.
/// Unknown keys are rejected so a setting the engine cannot honour fails at
/// load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PamConfig {
    /// Name of the service file under the PAM configuration directory.
    pub service: String,
}

impl Default for PamConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl PamConfig {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service() {
        assert_eq!(PamConfig::default().service, "google-authenticator");
        assert_eq!(PamConfig::new("login").service, "login");
    }

    #[test]
    fn test_partial_deserialize() {
        let config: PamConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PamConfig::default());
    }

    #[test]
    fn test_private_config_directory_is_rejected() {
        let result = serde_json::from_str::<PamConfig>(r#"{"conf_dir": "pam.d/"}"#);
        assert!(result.unwrap_err().to_string().contains("conf_dir"));
    }
}
