use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::call::RpcCall;
use crate::config::RpcConfig;
use crate::envelope::Envelope;
use crate::error::{Result, RpcError};
use crate::traits::{EventHandler, EventSubscriber, RpcTransport};

type Reply = Result<Value>;

/// Plugin-side RPC client.
///
/// Calls are tagged with a sequence id and parked in a pending table until
/// the dispatch task started by [`start`](Self::start) routes the matching
/// reply back. Cloning is cheap and every clone shares the same pending
/// table and subscriptions.
#[derive(Clone)]
pub struct PostRpcClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: RpcConfig,
    outbound: mpsc::UnboundedSender<Envelope>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    subscriptions: Mutex<HashMap<String, EventHandler>>,
    next_id: AtomicU64,
    started: AtomicBool,
    logging: AtomicBool,
}

impl PostRpcClient {
    /// Create a client from the two halves of a message channel.
    ///
    /// The client does not read replies until [`start`](Self::start) is
    /// called.
    pub fn new(
        config: RpcConfig,
        outbound: mpsc::UnboundedSender<Envelope>,
        inbound: mpsc::UnboundedReceiver<Envelope>,
    ) -> Self {
        let logging = config.logging;
        Self {
            inner: Arc::new(Inner {
                config,
                outbound,
                inbound: Mutex::new(Some(inbound)),
                pending: Mutex::new(HashMap::new()),
                subscriptions: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                started: AtomicBool::new(false),
                logging: AtomicBool::new(logging),
            }),
        }
    }

    /// Host origin this client addresses.
    pub fn origin(&self) -> &str {
        &self.inner.config.origin
    }

    /// Toggle per-call debug logging.
    pub fn logging(&self, enabled: bool) {
        self.inner.logging.store(enabled, Ordering::Relaxed);
    }

    /// Spawn the dispatch task that routes replies and events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<JoinHandle<()>> {
        let inbound = lock_recover(&self.inner.inbound)
            .take()
            .ok_or(RpcError::AlreadyStarted)?;
        self.inner.started.store(true, Ordering::SeqCst);
        Ok(tokio::spawn(dispatch(self.inner.clone(), inbound)))
    }

    /// Number of calls still waiting for a reply.
    pub fn pending_calls(&self) -> usize {
        lock_recover(&self.inner.pending).len()
    }

    /// Send `call` to the host and wait for its reply.
    pub async fn call(&self, call: RpcCall) -> Result<Value> {
        if !self.inner.started.load(Ordering::SeqCst) {
            return Err(RpcError::NotStarted);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let method = call.method.clone();
        let (tx, rx) = oneshot::channel();
        lock_recover(&self.inner.pending).insert(id, tx);
        // Removes the pending entry if this future is dropped or times out.
        let _guard = PendingGuard {
            inner: &self.inner,
            id,
        };

        if self.inner.logging.load(Ordering::Relaxed) {
            debug!(id, method = %method, origin = %self.inner.config.origin, "rpc call");
        }

        let envelope = Envelope::request(id, self.inner.config.origin.clone(), call);
        self.inner
            .outbound
            .send(envelope)
            .map_err(|_| RpcError::Closed)?;

        match tokio::time::timeout(self.inner.config.timeout, rx).await {
            Ok(Ok(reply)) => {
                if self.inner.logging.load(Ordering::Relaxed) {
                    debug!(id, method = %method, ok = reply.is_ok(), "rpc reply");
                }
                reply
            }
            Ok(Err(_)) => Err(RpcError::Closed),
            Err(_) => Err(RpcError::Timeout {
                method,
                timeout: self.inner.config.timeout,
            }),
        }
    }
}

impl RpcTransport for PostRpcClient {
    async fn call(&self, call: RpcCall) -> Result<Value> {
        PostRpcClient::call(self, call).await
    }
}

impl EventSubscriber for PostRpcClient {
    fn subscribe(&self, name: &str, handler: EventHandler) -> Result<()> {
        lock_recover(&self.inner.subscriptions).insert(name.to_string(), handler);
        Ok(())
    }

    fn unsubscribe(&self, name: &str) -> Result<()> {
        lock_recover(&self.inner.subscriptions).remove(name);
        Ok(())
    }
}

impl std::fmt::Debug for PostRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostRpcClient")
            .field("origin", &self.inner.config.origin)
            .field("timeout", &self.inner.config.timeout)
            .field("started", &self.inner.started.load(Ordering::Relaxed))
            .finish()
    }
}

struct PendingGuard<'a> {
    inner: &'a Inner,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock_recover(&self.inner.pending).remove(&self.id);
    }
}

/// Lock a table, taking it over if a panicking holder poisoned it. Every
/// critical section here is a single map operation, so the data is intact.
fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn dispatch(inner: Arc<Inner>, mut inbound: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = inbound.recv().await {
        if envelope.origin() != inner.config.origin {
            warn!(
                expected = %inner.config.origin,
                actual = %envelope.origin(),
                "ignoring message from unexpected origin"
            );
            continue;
        }

        match envelope {
            Envelope::Response {
                id, result, error, ..
            } => {
                let reply = match error {
                    Some(message) => Err(RpcError::Remote(message)),
                    None => Ok(result.unwrap_or(Value::Null)),
                };
                let sender = lock_recover(&inner.pending).remove(&id);
                match sender {
                    Some(tx) => {
                        if tx.send(reply).is_err() {
                            debug!(id, "caller stopped waiting; reply discarded");
                        }
                    }
                    None => debug!(id, "reply for abandoned call discarded"),
                }
            }
            Envelope::Event { name, payload, .. } => {
                let handler = lock_recover(&inner.subscriptions).get(&name).cloned();
                match handler {
                    Some(handler) => handler(payload),
                    None => debug!(event = %name, "no subscriber for host event"),
                }
            }
            Envelope::Request { id, method, .. } => {
                warn!(id, method = %method, "plugin received a request envelope; ignoring");
            }
        }
    }

    let drained: Vec<_> = lock_recover(&inner.pending).drain().collect();
    for (_, tx) in drained {
        let _ = tx.send(Err(RpcError::Closed));
    }
    debug!("rpc dispatch loop finished");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::channel::{channel, channel_with_host_origin};

    #[tokio::test]
    async fn call_before_start_is_rejected() {
        let (client, _host) = channel(RpcConfig::default());
        let err = client.call(RpcCall::bare("context")).await.unwrap_err();
        assert_eq!(err, RpcError::NotStarted);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let (client, _host) = channel(RpcConfig::default());
        client.start().unwrap();
        assert!(matches!(client.start(), Err(RpcError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn routes_reply_to_caller() {
        let (client, host) = channel(RpcConfig::default());
        client.start().unwrap();
        tokio::spawn(host.serve(|call: RpcCall| async move {
            assert_eq!(call.method, "confirm");
            Ok(json!(true))
        }));

        let reply = client
            .call(RpcCall::new("confirm", json!({ "message": "ok?" })))
            .await
            .unwrap();
        assert_eq!(reply, json!(true));
        assert_eq!(client.pending_calls(), 0);
    }

    #[tokio::test]
    async fn host_error_becomes_remote() {
        let (client, host) = channel(RpcConfig::default());
        client.start().unwrap();
        tokio::spawn(host.serve(|_call: RpcCall| async move { Err("no such record".to_string()) }));

        let err = client.call(RpcCall::bare("context")).await.unwrap_err();
        assert_eq!(err, RpcError::Remote("no such record".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_reply() {
        let config = RpcConfig {
            timeout: Duration::from_millis(200),
            ..RpcConfig::default()
        };
        let (client, mut host) = channel(config);
        client.start().unwrap();
        // Keep the endpoint alive but never answer.
        let _silent = tokio::spawn(async move { while host.recv().await.is_some() {} });

        let err = client.call(RpcCall::bare("context")).await.unwrap_err();
        assert!(matches!(err, RpcError::Timeout { ref method, .. } if method == "context"));
        assert_eq!(client.pending_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_from_foreign_origin_are_ignored() {
        let config = RpcConfig {
            timeout: Duration::from_millis(100),
            ..RpcConfig::for_origin("https://host.example")
        };
        let (client, host) = channel_with_host_origin(config, "https://evil.example");
        client.start().unwrap();
        let responder = host.responder();
        // Reply directly, bypassing the endpoint's own target-origin filter.
        responder.respond(1, Ok(json!("spoofed"))).unwrap();

        let err = client.call(RpcCall::bare("context")).await.unwrap_err();
        assert!(matches!(err, RpcError::Timeout { .. }));
    }

    #[tokio::test]
    async fn closed_host_fails_pending_calls() {
        let (client, mut host) = channel(RpcConfig::default());
        client.start().unwrap();
        tokio::spawn(async move {
            let _ = host.recv().await;
            drop(host);
        });

        let err = client.call(RpcCall::bare("context")).await.unwrap_err();
        assert_eq!(err, RpcError::Closed);
    }

    #[tokio::test]
    async fn dropped_call_leaves_no_pending_entry() {
        let (client, mut host) = channel(RpcConfig::default());
        client.start().unwrap();

        let call = client.call(RpcCall::bare("context"));
        let polled = tokio::time::timeout(Duration::from_millis(10), call).await;
        assert!(polled.is_err());
        assert_eq!(client.pending_calls(), 0);

        // A late reply for the abandoned call is discarded quietly.
        let request = host.recv().await.expect("request should arrive");
        host.responder().respond(request.id, Ok(json!({}))).unwrap();
    }

    #[test]
    fn poisoned_table_is_still_usable() {
        let table = Arc::new(Mutex::new(HashMap::from([(1_u64, "kept")])));
        let poisoner = table.clone();
        let _ = std::thread::spawn(move || {
            let _held = poisoner.lock().unwrap();
            panic!("handler panicked while holding the table");
        })
        .join();

        assert!(table.is_poisoned());
        assert_eq!(lock_recover(&table).get(&1), Some(&"kept"));
        lock_recover(&table).insert(2, "added");
        assert_eq!(lock_recover(&table).len(), 2);
    }

    #[tokio::test]
    async fn events_reach_subscribers() {
        let (client, host) = channel(RpcConfig::default());
        client.start().unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = oneshot::channel();
        let done_tx = Mutex::new(Some(done_tx));
        let counter = seen.clone();
        client
            .subscribe(
                "select",
                Arc::new(move |payload: Value| {
                    assert_eq!(payload, json!({ "id": 9 }));
                    counter.fetch_add(1, Ordering::SeqCst);
                    if let Some(tx) = done_tx.lock().unwrap().take() {
                        let _ = tx.send(());
                    }
                }),
            )
            .unwrap();

        let responder = host.responder();
        responder.emit("ignored", json!(null)).unwrap();
        responder.emit("select", json!({ "id": 9 })).unwrap();
        done_rx.await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        client.unsubscribe("select").unwrap();
        client.unsubscribe("never-registered").unwrap();
    }
}
