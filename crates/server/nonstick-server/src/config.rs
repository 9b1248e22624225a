//! Server configuration
//!
//! Values are layered, later sources winning:
//! - Built-in defaults
//! - A TOML file (`nonstick.toml`, or the path given by `--config` /
//!   `NONSTICK_CONFIG_FILE`)
//! - Environment variables with the `NONSTICK` prefix and `__` as the
//!   section separator, e.g. `NONSTICK__HYDRA__ADMIN_URL`
//! - Command-line flags

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use nonstick_hydra::HydraConfig;
use nonstick_pam::PamConfig;
use nonstick_pamsocket::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::{debug, info};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub flow: FlowConfig,
    pub hydra: HydraConfig,
    pub pam: PamConfig,
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

/// Listening address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

/// Which login flow backs the login and consent pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Complete Ory Hydra login and consent requests.
    #[default]
    Hydra,
    /// Fixed redirects, no authorization server.
    Noop,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub kind: FlowKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive for `tracing_subscriber::EnvFilter`.
    ///
    /// The configured level applies to this workspace's crates; everything
    /// else stays at `warn` unless the level is stricter.
    pub fn filter(&self) -> String {
        let level = self.level.to_lowercase();
        let others = match level.as_str() {
            "error" => "error",
            _ => "warn",
        };
        format!(
            "nonstick={level},nonstick_core={level},nonstick_hydra={level},\
             nonstick_pam={level},nonstick_pamsocket={level},{others}"
        )
    }
}

impl Config {
    /// Load configuration from an optional file and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if path.exists() {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!("No config file found at {}, using defaults", path.display());
        }

        builder = builder.add_source(
            Environment::with_prefix("NONSTICK")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.flow.kind == FlowKind::Hydra {
            if self.hydra.admin_url.trim().is_empty() {
                anyhow::bail!("Hydra admin URL cannot be empty");
            }
            url::Url::parse(&self.hydra.admin_url)
                .with_context(|| format!("Invalid Hydra admin URL '{}'", self.hydra.admin_url))?;
        }

        if self.hydra.login_remember_for_seconds <= 0 {
            anyhow::bail!("Login remember duration must be positive");
        }
        if self.hydra.consent_remember_for_seconds <= 0 {
            anyhow::bail!("Consent remember duration must be positive");
        }

        if self.pam.service.is_empty() {
            anyhow::bail!("PAM service name cannot be empty");
        }

        if self.bridge.max_frame_bytes == 0 {
            anyhow::bail!("Maximum frame size must be greater than 0");
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level,
                VALID_LEVELS
            );
        }

        let format = self.logging.format.to_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                VALID_FORMATS
            );
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}
