use zengine_fetch::FetchError;
use zengine_rpc::RpcError;

/// Errors returned by [`ZengineClient`](crate::ZengineClient).
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The host replied with a value of the wrong shape.
    #[error("unexpected reply to '{method}': {source}")]
    UnexpectedReply {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SdkError>;
