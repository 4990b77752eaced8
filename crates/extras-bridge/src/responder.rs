// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-request delivery handle.
//
// Terminal deliveries consume the responder, so a request can be answered
// terminally at most once. Keep-alive deliveries only borrow it.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use extras_core::error::{ExtrasError, Result};
use extras_core::types::{Outcome, RequestId, Response};

/// Outbound channel shared by every request of one bridge.
pub type ResponseSink = mpsc::UnboundedSender<Response>;

/// Receiving end handed to the app shell.
pub type Responses = mpsc::UnboundedReceiver<Response>;

/// Routes results for one request back to the caller.
#[derive(Debug)]
pub struct Responder {
    request_id: RequestId,
    sink: ResponseSink,
}

impl Responder {
    pub fn new(request_id: RequestId, sink: ResponseSink) -> Self {
        Self { request_id, sink }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Terminal success carrying `value`.
    pub fn success<T: Serialize>(self, value: T) {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.deliver(Outcome::Success(v), false);
            }
            Err(e) => self.failure(ExtrasError::Serialization(e)),
        }
    }

    /// Terminal success with no payload.
    pub fn ack(self) {
        self.deliver(Outcome::Success(Value::Null), false);
    }

    /// Terminal failure.
    pub fn failure(self, err: ExtrasError) {
        tracing::debug!(request_id = %self.request_id, error = %err, "request failed");
        self.deliver(Outcome::Failure(err.to_string()), false);
    }

    /// Terminal delivery of a handler result.
    pub fn finish(self, result: Result<Value>) {
        match result {
            Ok(v) => {
                self.deliver(Outcome::Success(v), false);
            }
            Err(e) => self.failure(e),
        }
    }

    /// Non-terminal delivery. Returns `false` once the caller has gone away.
    pub fn keep_alive(&self, result: Result<Value>) -> bool {
        let outcome = match result {
            Ok(v) => Outcome::Success(v),
            Err(e) => Outcome::Failure(e.to_string()),
        };
        self.deliver(outcome, true)
    }

    fn deliver(&self, outcome: Outcome, keep_alive: bool) -> bool {
        let response = Response {
            request_id: self.request_id.clone(),
            outcome,
            keep_alive,
        };
        if self.sink.send(response).is_err() {
            tracing::debug!(request_id = %self.request_id, "response dropped: caller channel closed");
            return false;
        }
        true
    }
}
