use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::call::RpcCall;
use crate::error::Result;

/// Something that can carry a method call to the host frame and hand back
/// its JSON result.
///
/// Implementations own serialization, origin checks, and timeouts. Callers
/// only see the settled outcome.
pub trait RpcTransport: Send + Sync {
    fn call(&self, call: RpcCall) -> impl Future<Output = Result<Value>> + Send;
}

impl<T: RpcTransport> RpcTransport for Arc<T> {
    fn call(&self, call: RpcCall) -> impl Future<Output = Result<Value>> + Send {
        (**self).call(call)
    }
}

impl<T: RpcTransport> RpcTransport for &T {
    fn call(&self, call: RpcCall) -> impl Future<Output = Result<Value>> + Send {
        (**self).call(call)
    }
}

/// Callback invoked with the payload of a host event.
pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// A transport that can also receive named events pushed by the host.
pub trait EventSubscriber {
    /// Register `handler` for `name`, replacing any previous handler.
    fn subscribe(&self, name: &str, handler: EventHandler) -> Result<()>;

    /// Drop the handler for `name`. Unknown names are ignored.
    fn unsubscribe(&self, name: &str) -> Result<()>;
}
