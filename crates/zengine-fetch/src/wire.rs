//! Serializable request/response shapes exchanged with the host frame.
//!
//! Nothing here can hold an [`AbortSignal`](crate::AbortSignal) or a
//! [`Headers`] collection: signals never leave the plugin and headers
//! travel as a flat mapping.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zengine_rpc::RpcCall;

use crate::config::FETCH_METHOD;
use crate::error::{FetchError, Result};
use crate::headers::{Headers, PlainHeaders};
use crate::request::{FetchInit, RequestCredentials, RequestMode};
use crate::response::{Response, ResponseInit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOptions {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
}

/// Fetch options as sent to the host: flat headers plus passthrough fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireFetchOptions {
    #[serde(default)]
    pub headers: PlainHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<RequestCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RequestMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Arguments of a `znFetch` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    pub options: ApiOptions,
    pub url: String,
    #[serde(rename = "fetchOptions")]
    pub fetch_options: WireFetchOptions,
}

impl WireRequest {
    /// Strip the signal, flatten headers, and keep everything else.
    pub fn new(url: impl Into<String>, init: FetchInit, api_version: &str) -> Self {
        let FetchInit {
            method,
            headers,
            body,
            signal: _,
            credentials,
            mode,
            cache,
            redirect,
            referrer,
            integrity,
            keepalive,
            extra,
        } = init;

        Self {
            options: ApiOptions {
                api_version: api_version.to_string(),
            },
            url: url.into(),
            fetch_options: WireFetchOptions {
                headers: headers.map(|h| h.into_plain()).unwrap_or_default(),
                method,
                body,
                credentials,
                mode,
                cache,
                redirect,
                referrer,
                integrity,
                keepalive,
                extra,
            },
        }
    }

    /// The RPC call carrying this request.
    pub fn into_call(self) -> serde_json::Result<RpcCall> {
        Ok(RpcCall::new(FETCH_METHOD, serde_json::to_value(self)?))
    }
}

fn default_status() -> u16 {
    200
}

/// The host's description of a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub headers: PlainHeaders,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    /// Set when the host itself reports the fetch as aborted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fetch_signal_aborted: bool,
}

impl WireResponse {
    /// Rebuild a [`Response`] with a proper header collection.
    ///
    /// Fails if the host sent a status outside `100..=999` or a header
    /// HTTP does not allow.
    pub fn into_response(self) -> Result<Response> {
        let WireResponse {
            body,
            headers,
            status,
            status_text,
            fetch_signal_aborted: _,
        } = self;

        let status_code =
            StatusCode::from_u16(status).map_err(|err| FetchError::InvalidStatus(status, err))?;
        let headers = Headers::try_from(&headers).map_err(FetchError::InvalidResponseHeader)?;

        Ok(Response::new(
            body,
            ResponseInit {
                status: status_code,
                status_text,
                headers,
            },
        ))
    }
}
