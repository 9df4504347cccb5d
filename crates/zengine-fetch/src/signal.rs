use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Owner side of an abort signal.
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signal to hand to a request. Every clone observes this controller.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    pub fn abort(&self) {
        self.abort_with("signal is aborted without reason");
    }

    /// Abort, recording `reason`. Only the first reason sticks.
    pub fn abort_with(&self, reason: impl Into<String>) {
        let _ = self.signal.reason.set(reason.into());
        self.signal.token.cancel();
    }
}

/// Cooperative cancellation token with an observable `aborted` state.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl AbortSignal {
    /// A signal that is already aborted.
    pub fn aborted_signal() -> Self {
        let controller = AbortController::new();
        controller.abort();
        controller.signal()
    }

    pub fn aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }
}
