// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subscription registry: at most one live watcher per signal.
//
// A new subscription supersedes the previous one. The old observer is torn
// down before the new one is installed, and the superseded caller is simply
// never written to again (no failure is sent).

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, trace};

use extras_core::error::Result;
use extras_core::types::{RequestId, Signal};

use crate::responder::Responder;

/// Removes a host-level observer. Runs exactly once, on [`Teardown::run`] or
/// on drop, whichever comes first.
pub struct Teardown(Option<Box<dyn FnOnce() + Send + 'static>>);

impl Teardown {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(action)))
    }

    /// A teardown with nothing to undo.
    pub fn noop() -> Self {
        Self(None)
    }

    pub fn run(mut self) {
        if let Some(action) = self.0.take() {
            action();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if let Some(action) = self.0.take() {
            action();
        }
    }
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Teardown").field(&self.0.is_some()).finish()
    }
}

struct Subscription {
    responder: Responder,
    teardown: Teardown,
}

/// Active watcher slots, keyed by signal.
#[derive(Default)]
pub struct SubscriptionRegistry {
    slots: HashMap<Signal, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `responder` the sole watcher of `signal`.
    ///
    /// Order: the previous observer is torn down, `install` registers the new
    /// host observer, then `current` is read and delivered as the first
    /// keep-alive response. If `install` fails the caller gets a terminal
    /// failure and the slot stays empty.
    pub fn subscribe(
        &mut self,
        signal: Signal,
        responder: Responder,
        install: impl FnOnce() -> Result<Teardown>,
        current: impl FnOnce() -> Result<Value>,
    ) -> bool {
        if let Some(previous) = self.slots.remove(&signal) {
            info!(
                %signal,
                superseded = %previous.responder.request_id(),
                by = %responder.request_id(),
                "replacing watcher"
            );
            previous.teardown.run();
        }

        let teardown = match install() {
            Ok(t) => t,
            Err(e) => {
                responder.failure(e);
                return false;
            }
        };

        debug!(%signal, request_id = %responder.request_id(), "watcher installed");
        let delivered = responder.keep_alive(current());
        let request_id = responder.request_id().clone();
        self.slots.insert(
            signal,
            Subscription {
                responder,
                teardown,
            },
        );
        if !delivered {
            self.unsubscribe_if_current(signal, &request_id);
        }
        delivered
    }

    /// Whether `request_id` is the live watcher of `signal`.
    pub fn is_current(&self, signal: Signal, request_id: &RequestId) -> bool {
        self.slots
            .get(&signal)
            .is_some_and(|s| s.responder.request_id() == request_id)
    }

    pub fn current_request(&self, signal: Signal) -> Option<&RequestId> {
        self.slots.get(&signal).map(|s| s.responder.request_id())
    }

    /// Deliver a changed value to the watcher of `signal`, provided it is
    /// still `request_id`. Notifications for superseded watchers are dropped.
    pub fn publish(&mut self, signal: Signal, request_id: &RequestId, value: Result<Value>) {
        let Some(slot) = self.slots.get(&signal) else {
            trace!(%signal, "change with no watcher");
            return;
        };
        if slot.responder.request_id() != request_id {
            trace!(%signal, stale = %request_id, "dropping change for superseded watcher");
            return;
        }
        if !slot.responder.keep_alive(value) {
            self.unsubscribe_if_current(signal, request_id);
        }
    }

    /// Remove the watcher of `signal` only if it is `request_id`.
    pub fn unsubscribe_if_current(&mut self, signal: Signal, request_id: &RequestId) -> bool {
        if !self.is_current(signal, request_id) {
            return false;
        }
        if let Some(sub) = self.slots.remove(&signal) {
            debug!(%signal, %request_id, "watcher removed");
            sub.teardown.run();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
