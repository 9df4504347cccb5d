use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use zengine_fetch::{zn_fetch, FetchConfig, FetchInput, Response};
use zengine_rpc::{EventSubscriber, RpcCall, RpcTransport};

use crate::error::{Result, SdkError};
use crate::types::{Dimensions, DropdownOptions, MessageType, ZENGINE_API_VERSION};

/// Typed access to the host application's RPC surface.
#[derive(Debug, Clone)]
pub struct ZengineClient<T> {
    transport: T,
    fetch_config: FetchConfig,
}

impl<T: RpcTransport> ZengineClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            fetch_config: FetchConfig::default(),
        }
    }

    pub fn with_fetch_config(mut self, fetch_config: FetchConfig) -> Self {
        self.fetch_config = fetch_config;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn invoke<R: DeserializeOwned>(&self, method: &str, args: Value) -> Result<R> {
        debug!(method, "host call");
        let reply = self.transport.call(RpcCall::new(method, args)).await?;
        serde_json::from_value(reply).map_err(|source| SdkError::UnexpectedReply {
            method: method.to_string(),
            source,
        })
    }

    /// Context of the current workspace, user, and plugin.
    pub async fn context(&self) -> Result<Value> {
        self.invoke("context", Value::Null).await
    }

    /// Ask the user a yes/no question in a host dialog.
    pub async fn confirm(&self, message: &str) -> Result<bool> {
        self.invoke("confirm", json!({ "message": message })).await
    }

    /// Show a temporary notification at the top of the host page.
    pub async fn message(&self, message: &str, kind: MessageType, duration: Duration) -> Result<()> {
        let params = json!({
            "message": message,
            "type": kind,
            "duration": u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
        self.invoke::<Value>("message", json!({ "params": params }))
            .await
            .map(|_| ())
    }

    /// Open the host's data filter builder and return the chosen filter.
    pub async fn filters_panel(&self, options: Value) -> Result<Value> {
        self.invoke("filtersPanel", json!({ "options": options })).await
    }

    /// Tell the host the plugin's content size. The host may clamp it.
    pub async fn resize(&self, dimensions: Dimensions) -> Result<Dimensions> {
        self.invoke("resize", json!({ "dimensions": dimensions })).await
    }

    /// Resize hook for content sizers: failures are logged and dropped.
    pub async fn update_size(&self, dimensions: Dimensions) -> Option<Dimensions> {
        match self.resize(dimensions).await {
            Ok(resized) => Some(resized),
            Err(err) => {
                warn!(error = %err, "resize rejected by host");
                None
            }
        }
    }

    /// Call the Zengine REST API through the host.
    pub async fn http(&self, request: Value) -> Result<Value> {
        self.invoke(
            "znHttp",
            json!({
                "options": { "apiVersion": ZENGINE_API_VERSION },
                "request": request,
            }),
        )
        .await
    }

    /// Call the plugin's own backend service through the host.
    pub async fn plugin_data(&self, options: Value) -> Result<Value> {
        self.invoke("znPluginData", options).await
    }

    /// Set a query parameter on the host page's URL.
    pub async fn location_search_params(&self, query: &str, value: impl Into<Value>) -> Result<Value> {
        self.invoke(
            "location",
            json!({
                "method": "searchParams",
                "args": [query, value.into()],
            }),
        )
        .await
    }

    /// Ask the host to reload its plugin frames, typically on unload.
    pub async fn reload_frames(&self) -> Result<()> {
        self.invoke::<Value>("reloadFrames", Value::Null)
            .await
            .map(|_| ())
    }

    /// `fetch` bridged through the host. See [`zn_fetch`].
    pub async fn fetch(&self, input: impl Into<FetchInput>) -> Result<Response> {
        Ok(zn_fetch(&self.transport, input, &self.fetch_config).await?)
    }
}

impl<T: RpcTransport + EventSubscriber> ZengineClient<T> {
    /// Open a host-rendered dropdown.
    ///
    /// Handlers in `options.events` are subscribed for the lifetime of the
    /// call and removed once it settles, whether or not it succeeded.
    pub async fn open_dropdown(&self, options: DropdownOptions) -> Result<Value> {
        let mut registered = Vec::with_capacity(options.events.len());
        for (name, handler) in &options.events {
            if let Err(err) = self.transport.subscribe(name, handler.clone()) {
                self.unsubscribe_all(&registered);
                return Err(err.into());
            }
            registered.push(name.as_str());
        }

        let args = json!({ "options": options.to_wire() });
        let outcome = self.invoke("dropdown", args).await;

        self.unsubscribe_all(&registered);
        outcome
    }

    fn unsubscribe_all(&self, names: &[&str]) {
        for name in names {
            if let Err(err) = self.transport.unsubscribe(name) {
                warn!(event = %name, error = %err, "failed to drop dropdown handler");
            }
        }
    }
}
