use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call::RpcCall;

/// A message crossing the frame boundary.
///
/// `origin` mirrors `postMessage` semantics: on a request it is the target
/// origin the plugin addressed, on a response or event it is the origin of
/// the sending host frame. Receivers drop envelopes whose origin does not
/// match what they expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Envelope {
    /// Plugin → host method call.
    Request {
        id: u64,
        origin: String,
        method: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        args: Value,
    },
    /// Host → plugin reply to a request.
    Response {
        id: u64,
        origin: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Host → plugin event pushed to a subscription.
    Event {
        origin: String,
        name: String,
        #[serde(default)]
        payload: Value,
    },
}

impl Envelope {
    /// Wrap a call addressed to `origin`.
    pub fn request(id: u64, origin: impl Into<String>, call: RpcCall) -> Self {
        Self::Request {
            id,
            origin: origin.into(),
            method: call.method,
            args: call.args,
        }
    }

    /// Build a reply from a handler outcome.
    pub fn response(
        id: u64,
        origin: impl Into<String>,
        outcome: std::result::Result<Value, String>,
    ) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(message) => (None, Some(message)),
        };
        Self::Response {
            id,
            origin: origin.into(),
            result,
            error,
        }
    }

    /// Build a host event.
    pub fn event(origin: impl Into<String>, name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            origin: origin.into(),
            name: name.into(),
            payload,
        }
    }

    /// Origin carried by this envelope.
    pub fn origin(&self) -> &str {
        match self {
            Self::Request { origin, .. }
            | Self::Response { origin, .. }
            | Self::Event { origin, .. } => origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_is_tagged() {
        let env = Envelope::request(
            7,
            "https://platform.zenginehq.com",
            RpcCall::new("confirm", json!({ "message": "sure?" })),
        );
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "type": "request",
                "id": 7,
                "origin": "https://platform.zenginehq.com",
                "method": "confirm",
                "args": { "message": "sure?" }
            })
        );
    }

    #[test]
    fn error_response_has_no_result() {
        let env = Envelope::response(3, "https://h.test", Err("denied".to_string()));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({ "type": "response", "id": 3, "origin": "https://h.test", "error": "denied" })
        );
        assert_eq!(env.origin(), "https://h.test");
    }
}
