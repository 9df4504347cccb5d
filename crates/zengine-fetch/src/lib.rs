//! A `fetch`-shaped HTTP client for sandboxed plugins.
//!
//! Plugins cannot reach Zengine's API servers directly, so requests are
//! serialized, sent to the host frame over RPC, executed there, and the
//! host's reply is rebuilt into a [`Response`]. Useful anywhere a library
//! expects a fetch implementation (GraphQL clients, for instance).
//!
//! Cancellation is best effort: the host cannot abort an in-flight request,
//! so an [`AbortSignal`] only stops the caller from waiting for it.

pub mod adapter;
pub mod config;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod signal;
pub mod status;
pub mod wire;

pub use adapter::zn_fetch;
pub use config::{FetchConfig, COMPLETION_GRACE, DEFAULT_POLL_INTERVAL, FETCH_API_VERSION, FETCH_METHOD};
pub use error::{FetchError, FetchErrorKind, Result};
pub use headers::{HeaderError, Headers, PlainHeaders};
pub use http::StatusCode;
pub use request::{FetchInit, FetchInput, HeadersInit, Request, RequestCredentials, RequestMode};
pub use response::{Response, ResponseInit};
pub use signal::{AbortController, AbortSignal};
pub use status::FetchStatus;
pub use wire::{ApiOptions, WireFetchOptions, WireRequest, WireResponse};
