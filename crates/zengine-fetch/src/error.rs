use zengine_rpc::RpcError;

use crate::headers::HeaderError;

/// Broad classification of a [`FetchError`], for callers that branch on the
/// kind of failure rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The RPC transport failed.
    Transport,
    /// The caller's abort signal fired first.
    Abort,
    /// The request could not be encoded.
    InvalidRequest,
    /// The host's reply was not a fetch response.
    InvalidResponse,
    /// The abort watcher task died.
    Internal,
}

/// Errors returned by [`zn_fetch`](crate::zn_fetch).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, passed through untouched.
    #[error(transparent)]
    Transport(#[from] RpcError),

    /// The abort signal was observed before the host replied.
    #[error("Aborted Request: {url}")]
    Aborted { url: String },

    #[error("invalid fetch request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("invalid fetch response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("invalid fetch response header: {0}")]
    InvalidResponseHeader(#[source] HeaderError),

    #[error("invalid fetch response status {0}")]
    InvalidStatus(u16, #[source] http::status::InvalidStatusCode),

    #[error("abort watcher failed: {0}")]
    Watcher(#[from] tokio::task::JoinError),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::Aborted { .. } => FetchErrorKind::Abort,
            Self::InvalidRequest(_) => FetchErrorKind::InvalidRequest,
            Self::InvalidResponse(_)
            | Self::InvalidResponseHeader(_)
            | Self::InvalidStatus(..) => FetchErrorKind::InvalidResponse,
            Self::Watcher(_) => FetchErrorKind::Internal,
        }
    }

    /// DOM-style error name (`AbortError` for aborts).
    pub fn name(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::Abort => "AbortError",
            FetchErrorKind::Transport => "TransportError",
            FetchErrorKind::InvalidRequest | FetchErrorKind::InvalidResponse => "TypeError",
            FetchErrorKind::Internal => "Error",
        }
    }

    pub fn is_abort(&self) -> bool {
        self.kind() == FetchErrorKind::Abort
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
