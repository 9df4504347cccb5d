//! In-process stand-in for the Zengine host frame.

use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;
use zengine_fetch::{PlainHeaders, WireRequest, WireResponse, FETCH_METHOD};
use zengine_rpc::{HostEndpoint, RpcCall};

/// Serve `host` until the plugin side closes. Every answer waits `latency`.
pub fn spawn_echo_host(host: HostEndpoint, latency: Duration) -> JoinHandle<()> {
    tokio::spawn(host.serve(move |call: RpcCall| async move {
        tokio::time::sleep(latency).await;
        echo(call)
    }))
}

/// `znFetch` answers 200 with the wire request as a JSON body; anything
/// else gets its args back.
fn echo(call: RpcCall) -> Result<Value, String> {
    debug!(method = %call.method, "echo host answering");
    if call.method != FETCH_METHOD {
        return Ok(call.args);
    }

    let request: WireRequest = serde_json::from_value(call.args)
        .map_err(|err| format!("malformed {FETCH_METHOD} args: {err}"))?;
    let body = serde_json::to_string(&request).map_err(|err| err.to_string())?;

    let mut headers = PlainHeaders::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    headers.insert("x-echo-url".to_string(), request.url);

    serde_json::to_value(WireResponse {
        body,
        headers,
        status: 200,
        status_text: "OK".to_string(),
        fetch_signal_aborted: false,
    })
    .map_err(|err| err.to_string())
}
