// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-delimited JSON framing: one request or response object per line.

use extras_core::error::Result;
use extras_core::types::{Request, Response};

/// Decode one input line. Blank lines yield `Ok(None)`.
pub fn decode_request(line: &str) -> Result<Option<Request>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Encode `response` as a single newline-terminated line.
pub fn encode_response(response: &Response) -> Result<String> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use extras_core::types::Outcome;

    use super::*;

    #[test]
    fn decodes_request_without_arguments() {
        let req = decode_request(r#"{"operation":"getLatency","requestId":"req-1"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(req.operation, "getLatency");
        assert!(req.arguments.is_empty());
        assert_eq!(req.request_id.to_string(), "req-1");
    }

    #[test]
    fn blank_line_is_skipped() {
        assert!(decode_request("   ").unwrap().is_none());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_request("openURL https://example.com").is_err());
    }

    #[test]
    fn response_is_one_line() {
        let resp = Response {
            request_id: "req-7".into(),
            outcome: Outcome::Success(json!(1.15)),
            keep_alive: true,
        };
        let line = encode_response(&resp).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        let back: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            back,
            json!({"requestId": "req-7", "outcome": {"success": 1.15}, "keepAlive": true})
        );
    }
}
