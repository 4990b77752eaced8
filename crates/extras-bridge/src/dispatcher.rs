// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatcher: operation name -> handler.
//
// The table is filled before the bridge starts and is shared read-only
// afterwards. An unregistered name is the only error detected here; every
// other failure comes from the handler or the platform behind it.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use extras_core::error::{ExtrasError, Result};
use extras_core::types::Request;

use crate::context::BridgeContext;
use crate::responder::{ResponseSink, Responder};

/// Positional arguments of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// String argument at `index`, or `None` if missing or not a string.
    pub fn string(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(Value::as_str)
    }

    /// String argument at `index`, or `""` if missing or not a string.
    pub fn string_or_empty(&self, index: usize) -> &str {
        self.string(index).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A registered operation. Runs on the bridge's main loop and must answer
/// through the responder, now or later.
pub type Handler = Box<dyn Fn(&mut BridgeContext, Arguments, Responder) + Send + Sync + 'static>;

/// Operation table.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
}

impl Dispatcher {
    /// An empty table. See [`Dispatcher::with_default_operations`] for the
    /// standard command surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that answers through its responder.
    pub fn register<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut BridgeContext, Arguments, Responder) + Send + Sync + 'static,
    {
        if self.handlers.contains_key(name) {
            return Err(ExtrasError::Bridge(format!(
                "operation already registered: {name}"
            )));
        }
        self.handlers.insert(name.to_string(), Box::new(handler));
        Ok(())
    }

    /// Register a handler whose result is the single terminal response.
    pub fn register_sync<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut BridgeContext, &Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(name, move |ctx, args, responder| {
            responder.finish(handler(ctx, &args));
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered operation names, unordered.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Resolve and run the handler for `request`. Must be called on the
    /// bridge's main loop.
    pub fn dispatch(&self, ctx: &mut BridgeContext, request: Request, sink: &ResponseSink) {
        let Request {
            operation,
            arguments,
            request_id,
        } = request;
        let responder = Responder::new(request_id, sink.clone());

        match self.handlers.get(&operation) {
            Some(handler) => {
                debug!(%operation, request_id = %responder.request_id(), "dispatching");
                handler(ctx, Arguments::new(arguments), responder);
            }
            None => {
                warn!(%operation, request_id = %responder.request_id(), "unknown operation");
                responder.failure(ExtrasError::UnknownOperation(operation));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arguments_fall_back_to_empty() {
        let args = Arguments::new(vec![json!("https://example.org"), json!(42)]);
        assert_eq!(args.string(0), Some("https://example.org"));
        assert_eq!(args.string(1), None);
        assert_eq!(args.string_or_empty(1), "");
        assert_eq!(args.string_or_empty(5), "");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut d = Dispatcher::new();
        d.register_sync("ping", |_, _| Ok(json!("pong"))).unwrap();
        assert!(d.register_sync("ping", |_, _| Ok(Value::Null)).is_err());
        assert!(d.contains("ping"));
        assert_eq!(d.operations().count(), 1);
    }
}
