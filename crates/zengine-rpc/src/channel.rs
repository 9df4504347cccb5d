use tokio::sync::mpsc;

use crate::client::PostRpcClient;
use crate::config::RpcConfig;
use crate::host::HostEndpoint;

/// Create a connected plugin client and host endpoint.
///
/// The host answers from `config.origin`, so replies pass the client's
/// origin check.
pub fn channel(config: RpcConfig) -> (PostRpcClient, HostEndpoint) {
    let host_origin = config.origin.clone();
    channel_with_host_origin(config, host_origin)
}

/// Create a pair whose host runs on an explicit origin.
///
/// When `host_origin` differs from `config.origin` the two sides drop each
/// other's messages, as browsers do for mismatched `postMessage` targets.
pub fn channel_with_host_origin(
    config: RpcConfig,
    host_origin: impl Into<String>,
) -> (PostRpcClient, HostEndpoint) {
    let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
    let (to_plugin_tx, to_plugin_rx) = mpsc::unbounded_channel();

    let client = PostRpcClient::new(config, to_host_tx, to_plugin_rx);
    let host = HostEndpoint::new(host_origin, to_host_rx, to_plugin_tx);
    (client, host)
}
