//! nonstick: an Ory Hydra login and consent provider that authenticates
//! users against the host's PAM stack.
//!
//! The login page opens a WebSocket to `/api/pamws`, over which the PAM
//! conversation runs. Once PAM accepts the user, the Hydra login request is
//! completed and the browser is redirected back to Hydra, which then sends it
//! to `/consent`.

use anyhow::{Context, Result};
use clap::Parser;
use nonstick_core::{AccountDirectory, LoginFlow, NoopFlow};
use nonstick_hydra::HydraFlow;
use nonstick_pam::PamEngine;
use nonstick_pamsocket::PamSocket;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod error;
mod logging;
mod pages;
mod routes;

use config::{Config, FlowKind};
use pages::Pages;
use routes::AppState;

/// PAM-backed login and consent provider for Ory Hydra
#[derive(Debug, Parser)]
#[command(name = "nonstick", version, about)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "NONSTICK_CONFIG_FILE", default_value = "nonstick.toml")]
    config: PathBuf,

    /// Load environment variables from a .env file first
    #[arg(long)]
    use_dotenv: bool,

    /// Address to bind to
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Login flow to use
    #[arg(long, value_enum)]
    flow: Option<FlowKind>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(flow) = self.flow {
            config.flow.kind = flow;
        }
    }
}

#[cfg(unix)]
fn host_accounts() -> Arc<dyn AccountDirectory> {
    Arc::new(nonstick_core::SystemAccounts)
}

#[cfg(not(unix))]
fn host_accounts() -> Arc<dyn AccountDirectory> {
    warn!("No host account database on this platform; every lookup will fail");
    Arc::new(nonstick_core::StaticAccounts::new())
}

fn build_state(config: &Config) -> Result<AppState> {
    let accounts = host_accounts();

    let flow: Arc<dyn LoginFlow> = match config.flow.kind {
        FlowKind::Hydra => {
            info!("Using Hydra at {}", config.hydra.admin_url);
            Arc::new(
                HydraFlow::new(&config.hydra, accounts.clone())
                    .context("Failed to create Hydra client")?,
            )
        }
        FlowKind::Noop => {
            warn!("Using the noop login flow; no authorization server is involved");
            Arc::new(NoopFlow)
        }
    };
    if flow.supports_oidc() {
        info!("Login flow issues OpenID Connect identity claims");
    }

    if !nonstick_pam::PAM_LINKED {
        warn!("Built without the `libpam` feature; every login will fail to start");
    }
    let engine = Arc::new(PamEngine::new(config.pam.clone()));
    let socket = PamSocket::new(engine, flow.clone(), accounts, config.bridge.clone());
    let pages = Arc::new(Pages::new()?);
    Ok(AppState {
        flow,
        socket,
        pages,
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.use_dotenv {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }

    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);
    config.validate()?;

    logging::init(&config.logging)?;

    let state = build_state(&config)?;
    let app = routes::router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("PAM socket endpoint: ws://{}/api/pamws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["nonstick", "--port", "9000", "--flow", "noop"]);
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.flow.kind, FlowKind::Noop);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_build_noop_state() {
        let mut config = Config::default();
        config.flow.kind = FlowKind::Noop;
        let state = build_state(&config).unwrap();
        assert!(!state.flow.supports_oidc());
    }

    #[cfg(feature = "libpam")]
    #[test]
    fn test_libpam_feature_reaches_engine() {
        assert!(nonstick_pam::PAM_LINKED);
    }

    #[test]
    fn test_build_hydra_state() {
        let state = build_state(&Config::default()).unwrap();
        assert!(state.flow.supports_oidc());
    }
}
