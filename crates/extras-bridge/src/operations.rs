// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The standard command surface.
//
// Most operations are a single platform call whose result (or error) is the
// terminal response. `detectMuteSwitch` answers once the platform completes;
// `manageSubscriptions` acknowledges as soon as the sheet is requested;
// `watchTextScaleFactor` keeps answering until superseded.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use extras_core::error::{ExtrasError, Result};
use extras_core::types::Signal;

use crate::context::BridgeContext;
use crate::dispatcher::{Arguments, Dispatcher};
use crate::responder::Responder;
use crate::traits::ShareItem;

/// Operation names as sent by the app shell.
pub mod names {
    pub const GET_BUILD_INFO: &str = "getBuildInfo";
    pub const GET_LATENCY: &str = "getLatency";
    pub const DETECT_MUTE_SWITCH: &str = "detectMuteSwitch";
    pub const DISABLE_IDLE_TIMEOUT: &str = "disableIdleTimeout";
    pub const ENABLE_IDLE_TIMEOUT: &str = "enableIdleTimeout";
    pub const REQUEST_APP_REVIEW: &str = "requestAppReview";
    pub const MANAGE_SUBSCRIPTIONS: &str = "manageSubscriptions";
    pub const OPEN_URL: &str = "openURL";
    pub const GET_TEXT_SCALE_FACTOR: &str = "getTextScaleFactor";
    pub const WATCH_TEXT_SCALE_FACTOR: &str = "watchTextScaleFactor";
    pub const SHARE: &str = "share";
}

impl Dispatcher {
    /// Table with every standard operation registered.
    pub fn with_default_operations() -> Result<Self> {
        let mut d = Dispatcher::new();
        d.register_sync(names::GET_BUILD_INFO, get_build_info)?;
        d.register_sync(names::GET_LATENCY, get_latency)?;
        d.register(names::DETECT_MUTE_SWITCH, detect_mute_switch)?;
        d.register_sync(names::DISABLE_IDLE_TIMEOUT, |ctx, _| set_idle_timer(ctx, true))?;
        d.register_sync(names::ENABLE_IDLE_TIMEOUT, |ctx, _| set_idle_timer(ctx, false))?;
        d.register_sync(names::REQUEST_APP_REVIEW, request_app_review)?;
        d.register_sync(names::MANAGE_SUBSCRIPTIONS, manage_subscriptions)?;
        d.register_sync(names::OPEN_URL, open_url)?;
        d.register_sync(names::GET_TEXT_SCALE_FACTOR, |ctx, _| {
            ctx.current_value(Signal::TextScaleFactor)
        })?;
        d.register(names::WATCH_TEXT_SCALE_FACTOR, |ctx, _, responder| {
            ctx.watch(Signal::TextScaleFactor, responder)
        })?;
        d.register_sync(names::SHARE, share)?;
        Ok(d)
    }
}

fn get_build_info(ctx: &mut BridgeContext, _args: &Arguments) -> Result<Value> {
    Ok(serde_json::to_value(ctx.build_info()?)?)
}

fn get_latency(ctx: &mut BridgeContext, _args: &Arguments) -> Result<Value> {
    let platform = ctx.platform();
    let millis = latency_millis(platform.output_latency()?, platform.io_buffer_duration()?);
    Ok(json!(millis))
}

/// Output latency plus one I/O buffer, in milliseconds.
pub fn latency_millis(output_latency: Duration, io_buffer: Duration) -> f64 {
    (output_latency + io_buffer).as_nanos() as f64 / 1_000_000.0
}

fn detect_mute_switch(ctx: &mut BridgeContext, _args: Arguments, responder: Responder) {
    let (tx, rx) = oneshot::channel();
    let started = ctx.platform().check_switch(Box::new(move |reading| {
        let _ = tx.send(reading);
    }));
    if let Err(e) = started {
        return responder.failure(e);
    }

    let main = ctx.main().clone();
    ctx.spawn(async move {
        let Ok(reading) = rx.await else {
            warn!(
                request_id = %responder.request_id(),
                "mute switch detector dropped its completion"
            );
            return;
        };
        debug!(success = reading.success, silent = reading.silent, "mute switch reading");
        main.post(move |_| responder.success(reading.is_muted()));
    });
}

fn set_idle_timer(ctx: &mut BridgeContext, disabled: bool) -> Result<Value> {
    ctx.platform().set_idle_timer_disabled(disabled)?;
    debug!(disabled, "idle timer updated");
    Ok(Value::Null)
}

fn request_app_review(ctx: &mut BridgeContext, _args: &Arguments) -> Result<Value> {
    ctx.platform().request_review()?;
    Ok(Value::Null)
}

/// Acknowledged once the sheet has been requested. Errors reported later by
/// the sheet are only logged; if no sheet can be shown, the configured web
/// page is opened instead.
fn manage_subscriptions(ctx: &mut BridgeContext, _args: &Arguments) -> Result<Value> {
    let (tx, rx) = oneshot::channel();
    let presented = ctx.platform().show_manage_subscriptions(Box::new(move |result| {
        let _ = tx.send(result);
    }));

    match presented {
        Ok(()) => ctx.spawn(async move {
            match rx.await {
                Ok(Ok(())) => debug!("subscription sheet closed"),
                Ok(Err(e)) => warn!(error = %e, "subscription sheet reported an error"),
                Err(_) => debug!("subscription sheet completion dropped"),
            }
        }),
        Err(e) => {
            info!(error = %e, "native subscription sheet unavailable, opening fallback page");
            open_subscriptions_fallback(ctx);
        }
    }
    Ok(Value::Null)
}

fn open_subscriptions_fallback(ctx: &BridgeContext) {
    let raw = &ctx.config().subscriptions_fallback_url;
    match Url::parse(raw) {
        Ok(url) => {
            if let Err(e) = ctx.platform().open_url(&url) {
                warn!(%url, error = %e, "could not open subscription fallback page");
            }
        }
        Err(e) => warn!(url = %raw, error = %e, "subscription fallback URL is invalid"),
    }
}

/// A missing or empty URL is acknowledged without opening anything.
fn open_url(ctx: &mut BridgeContext, args: &Arguments) -> Result<Value> {
    let raw = args.string_or_empty(0).trim();
    if raw.is_empty() {
        debug!("openURL without a URL, nothing to open");
        return Ok(Value::Null);
    }

    match Url::parse(raw) {
        Ok(url) => {
            ctx.platform().open_url(&url)?;
            Ok(Value::Null)
        }
        Err(e) if ctx.config().reject_malformed_urls => Err(ExtrasError::MalformedArguments(
            format!("invalid URL {raw:?}: {e}"),
        )),
        Err(e) => {
            warn!(url = raw, error = %e, "ignoring malformed URL");
            Ok(Value::Null)
        }
    }
}

fn share(ctx: &mut BridgeContext, args: &Arguments) -> Result<Value> {
    let item = ShareItem {
        text: args.string_or_empty(0).to_string(),
        title: args.string_or_empty(1).to_string(),
        url: args.string_or_empty(2).to_string(),
    };
    ctx.platform().share(&item)?;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_sums_output_and_buffer() {
        let ms = latency_millis(Duration::from_secs_f64(0.005), Duration::from_secs_f64(0.003));
        assert_eq!(ms, 8.0);
    }

    #[test]
    fn latency_keeps_sub_millisecond_precision() {
        let ms = latency_millis(Duration::from_micros(1_250), Duration::from_micros(2_500));
        assert_eq!(ms, 3.75);
    }

    #[test]
    fn default_table_has_every_operation() {
        let d = Dispatcher::with_default_operations().unwrap();
        for name in [
            names::GET_BUILD_INFO,
            names::GET_LATENCY,
            names::DETECT_MUTE_SWITCH,
            names::DISABLE_IDLE_TIMEOUT,
            names::ENABLE_IDLE_TIMEOUT,
            names::REQUEST_APP_REVIEW,
            names::MANAGE_SUBSCRIPTIONS,
            names::OPEN_URL,
            names::GET_TEXT_SCALE_FACTOR,
            names::WATCH_TEXT_SCALE_FACTOR,
            names::SHARE,
        ] {
            assert!(d.contains(name), "{name} not registered");
        }
        assert_eq!(d.operations().count(), 11);
    }
}
