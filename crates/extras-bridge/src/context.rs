// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridge's designated execution context.
//
// Every request, every platform change notification and every async
// completion is turned into a job on a single queue. The `MainLoop` owns the
// mutable state (`BridgeContext`) and runs jobs one at a time, so the
// build-info cache and the subscription slots are never touched concurrently
// and need no locks. `Bridge` is the cheap, cloneable, `Send` handle callers
// use to enqueue work.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use extras_core::config::BridgeConfig;
use extras_core::error::{ExtrasError, Result};
use extras_core::types::{BuildInfo, Request, RequestId, Signal};

use crate::dispatcher::Dispatcher;
use crate::registry::SubscriptionRegistry;
use crate::responder::{Responder, ResponseSink, Responses};
use crate::traits::{BundleMetadata, ChangeNotifier, PlatformServices};

type Job = Box<dyn FnOnce(&mut BridgeContext) + Send + 'static>;

/// Posts work onto the main loop without keeping it alive.
#[derive(Clone)]
pub struct MainHandle {
    jobs: mpsc::WeakUnboundedSender<Job>,
}

impl MainHandle {
    /// Queue `job`. Returns `false` if the main loop has stopped.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut BridgeContext) + Send + 'static,
    {
        match self.jobs.upgrade() {
            Some(tx) => tx.send(Box::new(job)).is_ok(),
            None => false,
        }
    }
}

/// State owned by the main loop and lent to handlers.
pub struct BridgeContext {
    platform: Arc<dyn PlatformServices>,
    config: BridgeConfig,
    build_info: Option<BuildInfo>,
    subscriptions: SubscriptionRegistry,
    main: MainHandle,
    runtime: Handle,
}

impl BridgeContext {
    pub fn platform(&self) -> &dyn PlatformServices {
        self.platform.as_ref()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn main(&self) -> &MainHandle {
        &self.main
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Run `future` on the runtime the bridge was created in. Results that
    /// touch bridge state must come back through [`MainHandle::post`].
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }

    /// App metadata, read from the platform on first use and cached for the
    /// lifetime of this context. Failed reads are not cached.
    pub fn build_info(&mut self) -> Result<&BuildInfo> {
        let info = match self.build_info.take() {
            Some(info) => info,
            None => {
                let info = build_info_from(self.platform.bundle_metadata()?);
                debug!(package = ?info.package_name, version = ?info.version, "build info cached");
                info
            }
        };
        Ok(self.build_info.insert(info))
    }

    /// Read the current value of `signal` from the host. No observers are
    /// added or removed.
    pub fn current_value(&self, signal: Signal) -> Result<Value> {
        read_signal(self.platform.as_ref(), &self.config, signal)
    }

    /// Make `responder` the only watcher of `signal`.
    pub fn watch(&mut self, signal: Signal, responder: Responder) {
        let notify = self.notifier(signal, responder.request_id().clone());
        let platform = self.platform.as_ref();
        let config = &self.config;
        self.subscriptions.subscribe(
            signal,
            responder,
            || match signal {
                Signal::TextScaleFactor => platform.observe_text_size(notify),
            },
            || read_signal(platform, config, signal),
        );
    }

    fn notifier(&self, signal: Signal, request_id: RequestId) -> ChangeNotifier {
        let main = self.main.clone();
        Arc::new(move || {
            let request_id = request_id.clone();
            if !main.post(move |ctx| ctx.signal_changed(signal, &request_id)) {
                trace!(%signal, "change notification after bridge shutdown");
            }
        })
    }

    fn signal_changed(&mut self, signal: Signal, request_id: &RequestId) {
        if !self.subscriptions.is_current(signal, request_id) {
            trace!(%signal, stale = %request_id, "ignoring change for superseded watcher");
            return;
        }
        let value = self.current_value(signal);
        self.subscriptions.publish(signal, request_id, value);
    }
}

fn build_info_from(meta: BundleMetadata) -> BuildInfo {
    BuildInfo {
        package_name: meta.identifier.clone(),
        base_package_name: meta.identifier,
        display_name: meta.display_name,
        version: meta.short_version,
        version_code: meta.build_version,
    }
}

fn read_signal(
    platform: &dyn PlatformServices,
    config: &BridgeConfig,
    signal: Signal,
) -> Result<Value> {
    match signal {
        Signal::TextScaleFactor => Ok(Value::from(text_scale_factor(platform, config)?)),
    }
}

/// Body point size relative to the default body point size (1.0 = default).
fn text_scale_factor(platform: &dyn PlatformServices, config: &BridgeConfig) -> Result<f64> {
    if config.default_body_point_size <= 0.0 {
        return Err(ExtrasError::Bridge(
            "default_body_point_size must be positive".into(),
        ));
    }
    Ok(platform.body_point_size()? / config.default_body_point_size)
}

// ---------------------------------------------------------------------------
// Caller-facing handle
// ---------------------------------------------------------------------------

/// Entry point for the app shell. Clone freely; the main loop stops once
/// every clone is dropped.
#[derive(Clone)]
pub struct Bridge {
    jobs: mpsc::UnboundedSender<Job>,
    dispatcher: Arc<Dispatcher>,
    sink: ResponseSink,
}

impl Bridge {
    /// Create a bridge with the standard command surface.
    ///
    /// Must be called inside a tokio runtime. Returns the handle, the main
    /// loop to drive, and the stream every response is delivered on.
    pub fn new(
        platform: Arc<dyn PlatformServices>,
        config: BridgeConfig,
    ) -> Result<(Self, MainLoop, Responses)> {
        Self::with_dispatcher(platform, config, Dispatcher::with_default_operations()?)
    }

    pub fn with_dispatcher(
        platform: Arc<dyn PlatformServices>,
        config: BridgeConfig,
        dispatcher: Dispatcher,
    ) -> Result<(Self, MainLoop, Responses)> {
        let runtime = Handle::try_current()
            .map_err(|e| ExtrasError::Bridge(format!("bridge requires a tokio runtime: {e}")))?;
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (sink, responses) = mpsc::unbounded_channel();

        info!(
            platform = platform.platform_name(),
            operations = dispatcher.operations().count(),
            "bridge created"
        );

        let ctx = BridgeContext {
            platform,
            config,
            build_info: None,
            subscriptions: SubscriptionRegistry::new(),
            main: MainHandle {
                jobs: jobs_tx.downgrade(),
            },
            runtime,
        };
        let bridge = Self {
            jobs: jobs_tx,
            dispatcher: Arc::new(dispatcher),
            sink,
        };
        Ok((bridge, MainLoop { ctx, jobs: jobs_rx }, responses))
    }

    /// Queue `request` for dispatch on the main loop. Never blocks.
    pub fn invoke(&self, request: Request) {
        let request_id = request.request_id.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let sink = self.sink.clone();
        let job: Job = Box::new(move |ctx| dispatcher.dispatch(ctx, request, &sink));
        if self.jobs.send(job).is_err() {
            warn!(%request_id, "bridge main loop has stopped");
            Responder::new(request_id, self.sink.clone())
                .failure(ExtrasError::Bridge("bridge main loop has stopped".into()));
        }
    }

    /// Invoke `operation` under a freshly minted request id.
    pub fn call(&self, operation: &str, arguments: Vec<Value>) -> RequestId {
        let request = Request::new(operation, arguments);
        let request_id = request.request_id.clone();
        self.invoke(request);
        request_id
    }
}

/// Runs queued jobs against the bridge state.
pub struct MainLoop {
    ctx: BridgeContext,
    jobs: mpsc::UnboundedReceiver<Job>,
}

impl MainLoop {
    /// Process jobs until every [`Bridge`] handle is dropped. Active
    /// watchers are torn down when the loop ends.
    pub async fn run(mut self) {
        info!("bridge main loop started");
        while let Some(job) = self.jobs.recv().await {
            job(&mut self.ctx);
        }
        info!("bridge main loop stopped");
    }

    /// Run every job queued so far without waiting. For hosts that drive the
    /// bridge from their own UI thread.
    pub fn pump(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.jobs.try_recv() {
            job(&mut self.ctx);
            ran += 1;
        }
        ran
    }

    pub fn context(&self) -> &BridgeContext {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_mirrors_bundle_identifier() {
        let info = build_info_from(BundleMetadata {
            identifier: Some("com.example.app".into()),
            display_name: Some("Example".into()),
            short_version: Some("1.4.0".into()),
            build_version: Some("140".into()),
        });
        assert_eq!(info.package_name.as_deref(), Some("com.example.app"));
        assert_eq!(info.base_package_name, info.package_name);
        assert_eq!(info.version.as_deref(), Some("1.4.0"));
        assert_eq!(info.version_code.as_deref(), Some("140"));
    }

    #[cfg(not(target_os = "ios"))]
    #[test]
    fn bridge_needs_a_runtime() {
        let result = Bridge::new(Arc::new(crate::stub::StubPlatform), BridgeConfig::default());
        assert!(matches!(result, Err(ExtrasError::Bridge(_))));
    }
}
