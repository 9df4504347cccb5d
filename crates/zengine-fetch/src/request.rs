use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::headers::{HeaderError, Headers, PlainHeaders};
use crate::signal::AbortSignal;

/// Headers as a caller may supply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadersInit {
    /// A header collection; repeated names are merged before sending.
    Native(Headers),
    /// An already-flat mapping, forwarded as-is.
    Plain(PlainHeaders),
}

impl HeadersInit {
    /// The flat mapping that goes on the wire.
    pub fn into_plain(self) -> PlainHeaders {
        match self {
            Self::Native(headers) => headers.to_plain(),
            Self::Plain(plain) => plain,
        }
    }
}

impl From<Headers> for HeadersInit {
    fn from(headers: Headers) -> Self {
        Self::Native(headers)
    }
}

impl From<PlainHeaders> for HeadersInit {
    fn from(plain: PlainHeaders) -> Self {
        Self::Plain(plain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCredentials {
    Omit,
    SameOrigin,
    Include,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

/// Fetch initialization options.
///
/// Everything except `headers` and `signal` is forwarded to the host
/// unchanged; `extra` carries fields this type has no slot for.
#[derive(Debug, Clone, Default)]
pub struct FetchInit {
    pub method: Option<String>,
    pub headers: Option<HeadersInit>,
    pub body: Option<String>,
    pub signal: Option<AbortSignal>,
    pub credentials: Option<RequestCredentials>,
    pub mode: Option<RequestMode>,
    pub cache: Option<String>,
    pub redirect: Option<String>,
    pub referrer: Option<String>,
    pub integrity: Option<String>,
    pub keepalive: Option<bool>,
    pub extra: Map<String, Value>,
}

impl FetchInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add one header value.
    ///
    /// Appends to a native collection (creating one if needed), which
    /// rejects names and values HTTP does not allow. A plain mapping is
    /// forwarded verbatim, so there the value just replaces any existing
    /// entry.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HeaderError> {
        match &mut self.headers {
            Some(HeadersInit::Native(headers)) => headers.append(name, value)?,
            Some(HeadersInit::Plain(plain)) => {
                plain.insert(name.to_string(), value.to_string());
            }
            None => {
                let mut headers = Headers::new();
                headers.append(name, value)?;
                self.headers = Some(HeadersInit::Native(headers));
            }
        }
        Ok(self)
    }

    pub fn headers(mut self, headers: impl Into<HeadersInit>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn credentials(mut self, credentials: RequestCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set an arbitrary passthrough field.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A request-like value that carries its own URL.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub init: FetchInit,
}

impl Request {
    pub fn new(url: impl Into<String>, init: FetchInit) -> Self {
        Self {
            url: url.into(),
            init,
        }
    }
}

/// The two ways `fetch` can be called: a URL with optional init, or a
/// self-describing request.
#[derive(Debug, Clone)]
pub enum FetchInput {
    Url(String, Option<FetchInit>),
    Request(Request),
}

impl FetchInput {
    /// Canonical `(url, init)` form.
    pub fn into_parts(self) -> (String, FetchInit) {
        match self {
            Self::Url(url, init) => (url, init.unwrap_or_default()),
            Self::Request(request) => (request.url, request.init),
        }
    }
}

impl From<&str> for FetchInput {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string(), None)
    }
}

impl From<String> for FetchInput {
    fn from(url: String) -> Self {
        Self::Url(url, None)
    }
}

impl<S: Into<String>> From<(S, FetchInit)> for FetchInput {
    fn from((url, init): (S, FetchInit)) -> Self {
        Self::Url(url.into(), Some(init))
    }
}

impl From<Request> for FetchInput {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}
