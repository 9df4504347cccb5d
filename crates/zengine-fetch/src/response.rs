use std::borrow::Cow;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::headers::Headers;

/// Status line and headers for a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInit {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: Headers,
}

impl Default for ResponseInit {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            status_text: String::new(),
            headers: Headers::new(),
        }
    }
}

/// An HTTP response rebuilt from the host's reply.
#[derive(Debug, Clone)]
pub struct Response {
    body: Bytes,
    status: StatusCode,
    status_text: String,
    headers: Headers,
}

impl Response {
    pub fn new(body: impl Into<Bytes>, init: ResponseInit) -> Self {
        Self {
            body: body.into(),
            status: init.status,
            status_text: init.status_text,
            headers: init.headers,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn bytes(&self) -> Bytes {
        self.body.clone()
    }

    /// Body as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn ok_covers_2xx_only() {
        let make = |status| {
            Response::new(
                "",
                ResponseInit {
                    status: StatusCode::from_u16(status).unwrap(),
                    ..ResponseInit::default()
                },
            )
        };
        assert!(make(200).ok());
        assert!(make(299).ok());
        assert!(!make(199).ok());
        assert!(!make(304).ok());
        assert!(!make(500).ok());
    }

    #[test]
    fn json_body() {
        let response = Response::new(r#"{"data":{"me":{"id":1}}}"#, ResponseInit::default());
        let value: Value = response.json().unwrap();
        assert_eq!(value, json!({ "data": { "me": { "id": 1 } } }));
        assert_eq!(response.text(), r#"{"data":{"me":{"id":1}}}"#);
        assert!(response.json::<Vec<u8>>().is_err());
    }
}
