// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording fake platform shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use extras_bridge::traits::*;
use extras_bridge::{Bridge, MainLoop, Responses, Teardown};
use extras_core::error::{ExtrasError, Result};
use extras_core::types::{RequestId, Response};
use extras_core::BridgeConfig;

/// How the fake answers `show_manage_subscriptions`.
#[derive(Debug, Clone)]
pub enum SheetBehaviour {
    Unavailable,
    Presented { completes_with_error: bool },
}

pub struct FakePlatform {
    pub bundle: BundleMetadata,
    pub metadata_reads: AtomicUsize,
    pub output_latency: Duration,
    pub io_buffer: Duration,
    /// Reading delivered synchronously by `check_switch`; `None` parks the
    /// completion in `pending_mute`.
    pub mute: Option<MuteSwitchReading>,
    pub pending_mute: Mutex<Vec<Completion<MuteSwitchReading>>>,
    pub idle_disabled: Mutex<Option<bool>>,
    pub reviews: AtomicUsize,
    pub sheet: SheetBehaviour,
    pub opened: Mutex<Vec<String>>,
    pub shared: Mutex<Vec<ShareItem>>,
    pub(crate) point_size: Mutex<f64>,
    pub(crate) observers: Arc<Mutex<HashMap<u64, ChangeNotifier>>>,
    pub(crate) next_observer: AtomicU64,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            bundle: BundleMetadata {
                identifier: Some("com.example.extras".into()),
                display_name: Some("Extras".into()),
                short_version: Some("2.1.0".into()),
                build_version: Some("210".into()),
            },
            metadata_reads: AtomicUsize::new(0),
            output_latency: Duration::from_secs_f64(0.005),
            io_buffer: Duration::from_secs_f64(0.003),
            mute: Some(MuteSwitchReading {
                success: true,
                silent: true,
            }),
            pending_mute: Mutex::new(Vec::new()),
            idle_disabled: Mutex::new(None),
            reviews: AtomicUsize::new(0),
            sheet: SheetBehaviour::Unavailable,
            opened: Mutex::new(Vec::new()),
            shared: Mutex::new(Vec::new()),
            point_size: Mutex::new(17.0),
            observers: Arc::new(Mutex::new(HashMap::new())),
            next_observer: AtomicU64::new(0),
        }
    }
}

impl FakePlatform {
    /// Change the preferred body size and fire every installed observer,
    /// like the system's content-size notification.
    pub fn set_point_size(&self, size: f64) {
        *self.point_size.lock().unwrap() = size;
        let notifiers: Vec<ChangeNotifier> =
            self.observers.lock().unwrap().values().cloned().collect();
        for notify in notifiers {
            notify();
        }
    }

    pub fn active_observers(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Complete every parked mute-switch detection with `reading`.
    pub fn complete_mute_checks(&self, reading: MuteSwitchReading) {
        let pending: Vec<_> = self.pending_mute.lock().unwrap().drain(..).collect();
        for done in pending {
            done(reading);
        }
    }
}

impl PlatformServices for FakePlatform {
    fn platform_name(&self) -> &str {
        "Fake"
    }
}

impl AppMetadata for FakePlatform {
    fn bundle_metadata(&self) -> Result<BundleMetadata> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bundle.clone())
    }
}

impl AudioSession for FakePlatform {
    fn output_latency(&self) -> Result<Duration> {
        Ok(self.output_latency)
    }

    fn io_buffer_duration(&self) -> Result<Duration> {
        Ok(self.io_buffer)
    }
}

impl MuteSwitch for FakePlatform {
    fn check_switch(&self, done: Completion<MuteSwitchReading>) -> Result<()> {
        match self.mute {
            Some(reading) => done(reading),
            None => self.pending_mute.lock().unwrap().push(done),
        }
        Ok(())
    }
}

impl IdleTimer for FakePlatform {
    fn set_idle_timer_disabled(&self, disabled: bool) -> Result<()> {
        *self.idle_disabled.lock().unwrap() = Some(disabled);
        Ok(())
    }
}

impl ReviewPrompt for FakePlatform {
    fn request_review(&self) -> Result<()> {
        self.reviews.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl SubscriptionManager for FakePlatform {
    fn show_manage_subscriptions(&self, done: Completion<Result<()>>) -> Result<()> {
        match self.sheet {
            SheetBehaviour::Unavailable => Err(ExtrasError::PlatformUnavailable),
            SheetBehaviour::Presented {
                completes_with_error,
            } => {
                if completes_with_error {
                    done(Err(ExtrasError::Collaborator("sheet failed".into())));
                } else {
                    done(Ok(()));
                }
                Ok(())
            }
        }
    }
}

impl UrlOpener for FakePlatform {
    fn open_url(&self, url: &Url) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

impl TextSizePreference for FakePlatform {
    fn body_point_size(&self) -> Result<f64> {
        Ok(*self.point_size.lock().unwrap())
    }

    fn observe_text_size(&self, notify: ChangeNotifier) -> Result<Teardown> {
        let id = self.next_observer.fetch_add(1, Ordering::SeqCst);
        self.observers.lock().unwrap().insert(id, notify);
        let observers = Arc::clone(&self.observers);
        Ok(Teardown::new(move || {
            observers.lock().unwrap().remove(&id);
        }))
    }
}

impl ShareSheet for FakePlatform {
    fn share(&self, item: &ShareItem) -> Result<()> {
        self.shared.lock().unwrap().push(item.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness helpers
// ---------------------------------------------------------------------------

pub fn start(platform: Arc<FakePlatform>) -> (Bridge, MainLoop, Responses) {
    start_with(platform, BridgeConfig::default())
}

pub fn start_with(platform: Arc<FakePlatform>, config: BridgeConfig) -> (Bridge, MainLoop, Responses) {
    Bridge::new(platform, config).expect("bridge starts inside a runtime")
}

/// Let spawned completions run and drain whatever they queued.
pub async fn settle(main: &mut MainLoop) {
    for _ in 0..8 {
        main.pump();
        tokio::task::yield_now().await;
    }
    main.pump();
}

/// Every response currently waiting on `rx`.
pub fn drain(rx: &mut Responses) -> Vec<Response> {
    let mut out = Vec::new();
    while let Ok(resp) = rx.try_recv() {
        out.push(resp);
    }
    out
}

/// Responses addressed to `id`, in delivery order.
pub fn for_request<'a>(responses: &'a [Response], id: &RequestId) -> Vec<&'a Response> {
    responses.iter().filter(|r| &r.request_id == id).collect()
}
