use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::call::RpcCall;
use crate::envelope::Envelope;
use crate::error::{Result, RpcError};

/// A request received by the host, waiting for a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRequest {
    pub id: u64,
    pub call: RpcCall,
}

/// Host side of the frame channel.
///
/// Used by tests and by the CLI's local echo host. A real host frame lives
/// in the parent page, outside this crate.
#[derive(Debug)]
pub struct HostEndpoint {
    origin: String,
    inbound: mpsc::UnboundedReceiver<Envelope>,
    responder: HostResponder,
}

/// Cloneable handle for sending replies and events to the plugin.
#[derive(Debug, Clone)]
pub struct HostResponder {
    origin: String,
    outbound: mpsc::UnboundedSender<Envelope>,
}

impl HostEndpoint {
    pub(crate) fn new(
        origin: impl Into<String>,
        inbound: mpsc::UnboundedReceiver<Envelope>,
        outbound: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        let origin = origin.into();
        Self {
            responder: HostResponder {
                origin: origin.clone(),
                outbound,
            },
            origin,
            inbound,
        }
    }

    /// Origin this host answers from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Handle for replying outside of [`serve`](Self::serve).
    pub fn responder(&self) -> HostResponder {
        self.responder.clone()
    }

    /// Wait for the next request addressed to this host.
    ///
    /// Requests targeting another origin are dropped. Returns `None` once
    /// every plugin client is gone.
    pub async fn recv(&mut self) -> Option<HostRequest> {
        while let Some(envelope) = self.inbound.recv().await {
            match envelope {
                Envelope::Request {
                    id,
                    origin,
                    method,
                    args,
                } => {
                    if origin != self.origin {
                        warn!(id, target = %origin, host = %self.origin, "dropping request for another origin");
                        continue;
                    }
                    return Some(HostRequest {
                        id,
                        call: RpcCall { method, args },
                    });
                }
                other => debug!(?other, "host ignoring non-request envelope"),
            }
        }
        None
    }

    /// Answer every request with `handler` until the plugin side closes.
    ///
    /// Each request is handled on its own task so a slow call does not hold
    /// up the ones behind it.
    pub async fn serve<H, Fut>(mut self, handler: H)
    where
        H: Fn(RpcCall) -> Fut,
        Fut: Future<Output = std::result::Result<Value, String>> + Send + 'static,
    {
        while let Some(request) = self.recv().await {
            let reply = handler(request.call);
            let responder = self.responder.clone();
            tokio::spawn(async move {
                let outcome = reply.await;
                if responder.respond(request.id, outcome).is_err() {
                    debug!(id = request.id, "plugin went away before reply");
                }
            });
        }
    }
}

impl HostResponder {
    /// Send the outcome of request `id`.
    pub fn respond(&self, id: u64, outcome: std::result::Result<Value, String>) -> Result<()> {
        self.outbound
            .send(Envelope::response(id, self.origin.clone(), outcome))
            .map_err(|_| RpcError::Closed)
    }

    /// Push a named event to the plugin.
    pub fn emit(&self, name: &str, payload: Value) -> Result<()> {
        self.outbound
            .send(Envelope::event(self.origin.clone(), name, payload))
            .map_err(|_| RpcError::Closed)
    }
}
