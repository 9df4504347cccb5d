use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single named method invocation on the host frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcCall {
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl RpcCall {
    /// Create a call with arguments.
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Create a call that carries no arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }
}
