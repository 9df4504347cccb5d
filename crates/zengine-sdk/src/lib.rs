//! Plugin-side client for the Zengine host application.
//!
//! [`ZengineClient`] wraps any [`RpcTransport`](zengine_rpc::RpcTransport)
//! and exposes the host's call surface as typed async methods: context
//! lookup, dialogs, notifications, resizing, API access, and `fetch`.

pub mod client;
pub mod error;
pub mod types;

pub use client::ZengineClient;
pub use error::{Result, SdkError};
pub use types::{
    Dimensions, DropdownOptions, DropdownSide, MessageType, DEFAULT_MESSAGE_DURATION,
    ZENGINE_API_VERSION,
};
