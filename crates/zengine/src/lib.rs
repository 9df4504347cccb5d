//! Rust SDK for plugins embedded in the Zengine host application.
//!
//! # Crate Structure
//!
//! - [`rpc`]: Cross-frame call/response client and host endpoint
//! - [`fetch`]: `fetch` bridged through the host, with abort support
//! - [`sdk`]: Typed client for the host's call surface (behind `sdk` feature)

/// Re-export RPC types.
pub mod rpc {
    pub use zengine_rpc::*;
}

/// Re-export bridged fetch types.
pub mod fetch {
    pub use zengine_fetch::*;
}

/// Re-export SDK client types (requires `sdk` feature).
#[cfg(feature = "sdk")]
pub mod sdk {
    pub use zengine_sdk::*;
}
