use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// Per-connection limits of the PAM WebSocket bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long a prompt may wait for the client's answer. Unset or zero
    /// waits for as long as the connection stays open.
    pub reply_timeout_seconds: Option<u64>,
    /// Largest accepted client frame.
    pub max_frame_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            reply_timeout_seconds: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl BridgeConfig {
    /// Bound each prompt by `timeout`, rounded up to whole seconds so a
    /// non-zero bound never becomes unbounded.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        let seconds = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.reply_timeout_seconds = Some(seconds);
        self
    }

    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_seconds
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }
}
