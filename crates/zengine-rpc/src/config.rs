use std::time::Duration;

use crate::origin::DEFAULT_PARENT_ORIGIN;

/// Default time to wait for the host to answer a call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`PostRpcClient`](crate::PostRpcClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// Origin of the host frame. Requests are addressed to it and replies
    /// from any other origin are ignored.
    pub origin: String,
    /// Per-call reply timeout.
    pub timeout: Duration,
    /// Emit a debug event for every call and reply.
    pub logging: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_PARENT_ORIGIN.to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
            logging: false,
        }
    }
}

impl RpcConfig {
    /// Configuration targeting a specific host origin.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }
}
