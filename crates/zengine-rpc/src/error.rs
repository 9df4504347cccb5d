use std::time::Duration;

/// Errors that can occur while calling the host frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// The host handled the call and reported a failure.
    #[error("host rejected call: {0}")]
    Remote(String),

    /// No reply arrived within the configured timeout.
    #[error("call '{method}' timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    /// The channel to the host is gone.
    #[error("rpc channel closed")]
    Closed,

    /// `call` was used before `start`.
    #[error("rpc client not started")]
    NotStarted,

    /// `start` was called twice.
    #[error("rpc client already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, RpcError>;
