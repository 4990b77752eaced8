// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native services the bridge
// delegates to.
//
// The bridge never reimplements these services; it only needs the inputs and
// outputs listed here. Synchronous errors are reported through `Result`;
// asynchronous completions arrive through a `Completion` callback which may
// be invoked from any thread.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use extras_core::error::Result;

use crate::registry::Teardown;

/// One-shot completion callback handed to asynchronous platform APIs.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Invoked by the platform every time an observed value changes.
pub type ChangeNotifier = Arc<dyn Fn() + Send + Sync + 'static>;

/// Unified bridge that groups all native capabilities.
pub trait PlatformServices:
    AppMetadata
    + AudioSession
    + MuteSwitch
    + IdleTimer
    + ReviewPrompt
    + SubscriptionManager
    + UrlOpener
    + TextSizePreference
    + ShareSheet
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "iOS", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Application bundle metadata.
pub trait AppMetadata {
    fn bundle_metadata(&self) -> Result<BundleMetadata>;
}

/// Audio route timing.
pub trait AudioSession {
    /// Latency of the current output route.
    fn output_latency(&self) -> Result<Duration>;

    /// Duration of one I/O buffer.
    fn io_buffer_duration(&self) -> Result<Duration>;
}

/// Hardware ring/silent switch.
pub trait MuteSwitch {
    /// Start a detection. `done` receives the reading once it is known.
    fn check_switch(&self, done: Completion<MuteSwitchReading>) -> Result<()>;
}

/// Screen auto-lock suppression.
pub trait IdleTimer {
    fn set_idle_timer_disabled(&self, disabled: bool) -> Result<()>;
}

/// In-app rating prompt. The platform may decline to show anything.
pub trait ReviewPrompt {
    fn request_review(&self) -> Result<()>;
}

/// Native subscription management sheet.
pub trait SubscriptionManager {
    /// Present the sheet. Returns `PlatformUnavailable` when no sheet can be
    /// shown right now; `done` reports the outcome of a presented sheet.
    fn show_manage_subscriptions(&self, done: Completion<Result<()>>) -> Result<()>;
}

/// Hand a URL to the system.
pub trait UrlOpener {
    fn open_url(&self, url: &Url) -> Result<()>;
}

/// User's preferred text size.
pub trait TextSizePreference {
    /// Current point size of the body text style.
    fn body_point_size(&self) -> Result<f64>;

    /// Call `notify` on every text-size change until the returned teardown
    /// runs.
    fn observe_text_size(&self, notify: ChangeNotifier) -> Result<Teardown>;
}

/// OS share sheet.
pub trait ShareSheet {
    fn share(&self, item: &ShareItem) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Value types exchanged with the platform
// ---------------------------------------------------------------------------

/// Raw bundle fields as read from the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleMetadata {
    pub identifier: Option<String>,
    pub display_name: Option<String>,
    pub short_version: Option<String>,
    pub build_version: Option<String>,
}

/// Result of one mute-switch detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuteSwitchReading {
    /// Detection completed without error.
    pub success: bool,
    /// Switch is in the silent position.
    pub silent: bool,
}

impl MuteSwitchReading {
    /// Muted only when the detection succeeded and reported silence.
    pub fn is_muted(&self) -> bool {
        self.success && self.silent
    }
}

/// Content for the share sheet. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareItem {
    pub text: String,
    pub title: String,
    pub url: String,
}
