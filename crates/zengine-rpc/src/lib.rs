//! Cross-frame RPC for plugins embedded in the Zengine host application.
//!
//! A plugin never talks to the network or to the host DOM directly. Every
//! privileged operation is a named method call routed through the parent
//! frame. This crate provides the plumbing for those calls:
//! - [`RpcCall`] / [`Envelope`] describe what crosses the frame boundary
//! - [`RpcTransport`] is the seam every higher layer is written against
//! - [`PostRpcClient`] / [`HostEndpoint`] are an in-process channel pair
//!   standing in for `window.postMessage`

pub mod call;
pub mod channel;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod host;
pub mod origin;
pub mod traits;

pub use call::RpcCall;
pub use channel::{channel, channel_with_host_origin};
pub use client::PostRpcClient;
pub use config::{RpcConfig, DEFAULT_CALL_TIMEOUT};
pub use envelope::Envelope;
pub use error::{Result, RpcError};
pub use host::{HostEndpoint, HostRequest, HostResponder};
pub use origin::{origin_of, resolve_parent_origin, DEFAULT_PARENT_ORIGIN};
pub use traits::{EventHandler, EventSubscriber, RpcTransport};
