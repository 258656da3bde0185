//! Result normalizer.
//!
//! Every dispatch ends in a [`ResponseEnvelope`]; callers never see a raw error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// Uniform `{success, data, error}` result record.
///
/// Exactly one of `data` and `error` is set. The other serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful envelope carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    /// Failed envelope carrying a human-readable message.
    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pretty-printed JSON form returned to MCP clients.
    pub fn to_json_pretty(&self) -> String {
        // Serializing a Value-only struct cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|e| serialization_failure(&e))
    }
}

fn serialization_failure(err: &dyn fmt::Display) -> String {
    json!({
        "success": false,
        "data": null,
        "error": format!("serialization failed: {}", err),
    })
    .to_string()
}

/// Fold an action outcome into an envelope.
pub fn normalize(result: Result<Value>) -> ResponseEnvelope {
    match result {
        Ok(data) => ResponseEnvelope::ok(data),
        Err(err) => ResponseEnvelope::fail(err.to_string()),
    }
}
