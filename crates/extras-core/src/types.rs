// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the command/callback bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Opaque token identifying one in-flight call.
///
/// Callers choose the token; the bridge only echoes it back on every
/// response produced for that call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named operation invocation from the app shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Operation name, e.g. `getBuildInfo`.
    pub operation: String,
    /// Positional arguments. Their meaning is defined per operation.
    #[serde(default)]
    pub arguments: Vec<Value>,
    pub request_id: RequestId,
}

impl Request {
    pub fn new(operation: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            arguments,
            request_id: RequestId::generate(),
        }
    }
}

/// Result carried by a single response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The success payload, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }
}

/// One delivery back to the app shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub request_id: RequestId,
    pub outcome: Outcome,
    /// `true` when more responses may follow under the same request id.
    pub keep_alive: bool,
}

impl Response {
    pub fn is_terminal(&self) -> bool {
        !self.keep_alive
    }
}

/// App metadata reported by `getBuildInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub package_name: Option<String>,
    pub base_package_name: Option<String>,
    pub display_name: Option<String>,
    pub version: Option<String>,
    pub version_code: Option<String>,
}

/// Host-observable values that support a single active watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
    TextScaleFactor,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::TextScaleFactor => f.write_str("textScaleFactor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_with_missing_arguments() {
        let req: Request =
            serde_json::from_value(json!({"operation": "getLatency", "requestId": "cb-1"}))
                .unwrap();
        assert_eq!(req.operation, "getLatency");
        assert!(req.arguments.is_empty());
        assert_eq!(req.request_id, RequestId::from("cb-1"));
    }

    #[test]
    fn response_wire_shape() {
        let resp = Response {
            request_id: "cb-7".into(),
            outcome: Outcome::Failure("unknown operation: nope".into()),
            keep_alive: false,
        };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "requestId": "cb-7",
                "outcome": {"failure": "unknown operation: nope"},
                "keepAlive": false
            })
        );
    }

    #[test]
    fn build_info_uses_camel_case_keys() {
        let info = BuildInfo {
            package_name: Some("com.example.app".into()),
            version_code: Some("42".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["packageName"], "com.example.app");
        assert_eq!(v["versionCode"], "42");
        assert!(v["displayName"].is_null());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
