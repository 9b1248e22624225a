//! [`AuthEngine`] backed by the host PAM stack.

use crate::config::PamConfig;
use crate::conversation::ConversationRelay;
use nonstick_core::{AuthEngine, Conversation, EngineError, EngineResult};
use tracing::{debug, info};

/// Runs one PAM transaction per [`AuthEngine::authenticate`] call.
#[derive(Debug, Clone)]
pub struct PamEngine {
    config: PamConfig,
}

impl PamEngine {
    pub fn new(config: PamConfig) -> Self {
        info!("Using PAM service '{}'", config.service);
        Self { config }
    }

    pub fn service(&self) -> &str {
        &self.config.service
    }
}

impl AuthEngine for PamEngine {
    #[cfg(feature = "libpam")]
    fn authenticate(&self, conversation: Box<dyn Conversation>) -> EngineResult<String> {
        use pam_client::{Context, Flag};

        let relay = ConversationRelay::new(conversation);
        let mut context = Context::new(&self.config.service, None, relay)
            .map_err(|e| EngineError::Start(e.to_string()))?;
        debug!("PAM transaction started for service '{}'", self.config.service);

        if let Err(e) = context.authenticate(Flag::NONE) {
            let reason = match context.conversation_mut().take_failure() {
                Some(failure) => format!("{e} ({failure})"),
                None => e.to_string(),
            };
            return Err(EngineError::Authentication(reason));
        }

        context.user().map_err(|e| EngineError::Item(e.to_string()))
    }

    #[cfg(not(feature = "libpam"))]
    fn authenticate(&self, conversation: Box<dyn Conversation>) -> EngineResult<String> {
        let _relay = ConversationRelay::new(conversation);
        debug!("PAM transaction requested for service '{}'", self.config.service);
        Err(EngineError::Start(
            "nonstick was built without PAM support (enable the `libpam` feature)".to_string(),
        ))
    }
}
