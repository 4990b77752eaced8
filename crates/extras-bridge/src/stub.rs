// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub services for desktop/CI builds where native mobile APIs are unavailable.
//
// Every trait method returns `PlatformUnavailable`; the real implementation
// lives in the `ios` module.

use std::time::Duration;

use url::Url;

use extras_core::error::{ExtrasError, Result};

use crate::registry::Teardown;
use crate::traits::*;

/// No-op services returned on non-mobile platforms.
pub struct StubPlatform;

impl PlatformServices for StubPlatform {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl AppMetadata for StubPlatform {
    fn bundle_metadata(&self) -> Result<BundleMetadata> {
        tracing::warn!("AppMetadata::bundle_metadata called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl AudioSession for StubPlatform {
    fn output_latency(&self) -> Result<Duration> {
        tracing::warn!("AudioSession::output_latency called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }

    fn io_buffer_duration(&self) -> Result<Duration> {
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl MuteSwitch for StubPlatform {
    fn check_switch(&self, _done: Completion<MuteSwitchReading>) -> Result<()> {
        tracing::warn!("MuteSwitch::check_switch called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl IdleTimer for StubPlatform {
    fn set_idle_timer_disabled(&self, _disabled: bool) -> Result<()> {
        tracing::warn!("IdleTimer::set_idle_timer_disabled called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl ReviewPrompt for StubPlatform {
    fn request_review(&self) -> Result<()> {
        tracing::warn!("ReviewPrompt::request_review called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl SubscriptionManager for StubPlatform {
    fn show_manage_subscriptions(&self, _done: Completion<Result<()>>) -> Result<()> {
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl UrlOpener for StubPlatform {
    fn open_url(&self, url: &Url) -> Result<()> {
        tracing::warn!(%url, "UrlOpener::open_url called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl TextSizePreference for StubPlatform {
    fn body_point_size(&self) -> Result<f64> {
        Err(ExtrasError::PlatformUnavailable)
    }

    fn observe_text_size(&self, _notify: ChangeNotifier) -> Result<Teardown> {
        tracing::warn!("TextSizePreference::observe_text_size called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}

impl ShareSheet for StubPlatform {
    fn share(&self, _item: &ShareItem) -> Result<()> {
        tracing::warn!("ShareSheet::share called on stub platform");
        Err(ExtrasError::PlatformUnavailable)
    }
}
