// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform services via objc2.
//
// Requires compilation with the iOS SDK (Xcode). Each trait method wraps the
// corresponding Foundation / UIKit / AVFAudio / StoreKit API through
// Objective-C message sends.
//
// This module is cfg-gated to `target_os = "ios"`. UIKit calls require the
// main thread; methods return `ExtrasError::Bridge` when called off-main.
// Hosts satisfy this by pumping the bridge's `MainLoop` from the main thread.
//
// Frameworks without objc2 bindings in our dependency set (AVFAudio,
// StoreKit) are reached by class name at runtime, so a missing class degrades
// to `PlatformUnavailable` instead of failing to link.

#![cfg(target_os = "ios")]

use std::ptr::NonNull;
use std::sync::Mutex;
use std::time::Duration;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject, Bool};
use objc2::{MainThreadMarker, msg_send, sel};
use objc2_foundation::{NSArray, NSBundle, NSDictionary, NSNotification, NSString, NSURL};
use objc2_ui_kit::{UIActivityViewController, UIApplication, UIViewController};
use url::Url;

use extras_core::error::{ExtrasError, Result};

use crate::registry::Teardown;
use crate::traits::*;

// ---------------------------------------------------------------------------
// UIKit constants
// ---------------------------------------------------------------------------

unsafe extern "C" {
    /// `UIFontTextStyleBody`, the text style whose size tracks the user's
    /// preferred content size category.
    static UIFontTextStyleBody: &'static NSString;

    /// Posted on the main queue when the preferred content size changes.
    static UIContentSizeCategoryDidChangeNotification: &'static NSString;
}

// Pull in the frameworks whose classes are looked up by name.
#[link(name = "AVFAudio", kind = "framework")]
unsafe extern "C" {}
#[link(name = "StoreKit", kind = "framework")]
unsafe extern "C" {}

/// `UISceneActivationStateForegroundActive`.
const SCENE_FOREGROUND_ACTIVE: isize = 0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Assert that we are on the main thread and return the marker.
fn require_main_thread() -> Result<MainThreadMarker> {
    MainThreadMarker::new()
        .ok_or_else(|| ExtrasError::Bridge("must be called from the main thread".into()))
}

/// Look up an Objective-C class that may not exist on this OS version.
fn class(name: &std::ffi::CStr) -> Result<&'static AnyClass> {
    AnyClass::get(name).ok_or(ExtrasError::PlatformUnavailable)
}

/// Obtain the root `UIViewController` from the key window.
fn root_view_controller(mtm: MainThreadMarker) -> Result<Retained<UIViewController>> {
    let app = UIApplication::sharedApplication(mtm);

    // SAFETY: keyWindow / rootViewController are well-known UIKit selectors;
    // the marker proves we are on the main thread.
    let root: Option<Retained<UIViewController>> = unsafe {
        let window: Option<Retained<AnyObject>> = msg_send![&app, keyWindow];
        window.and_then(|w| msg_send![&w, rootViewController])
    };

    root.ok_or_else(|| ExtrasError::Bridge("no root view controller available".into()))
}

/// The first connected `UIWindowScene` in the foreground-active state.
fn foreground_window_scene(mtm: MainThreadMarker) -> Option<Retained<AnyObject>> {
    let app = UIApplication::sharedApplication(mtm);
    let window_scene = AnyClass::get(c"UIWindowScene")?;

    // SAFETY: connectedScenes (NSSet<UIScene *>) and allObjects are standard
    // UIKit / Foundation selectors, called on the main thread.
    let scenes: Retained<NSArray<AnyObject>> = unsafe {
        let set: Retained<AnyObject> = msg_send![&app, connectedScenes];
        msg_send![&set, allObjects]
    };

    scenes.iter().find(|scene| {
        // SAFETY: activationState and isKindOfClass: are defined on every
        // UIScene.
        unsafe {
            let state: isize = msg_send![&**scene, activationState];
            let is_window: bool = msg_send![&**scene, isKindOfClass: window_scene];
            state == SCENE_FOREGROUND_ACTIVE && is_window
        }
    })
}

fn info_string(bundle: &NSBundle, key: &str) -> Option<String> {
    let key = NSString::from_str(key);
    // SAFETY: objectForInfoDictionaryKey: returns an autoreleased id or nil.
    let value: Option<Retained<AnyObject>> =
        unsafe { msg_send![bundle, objectForInfoDictionaryKey: &*key] };
    value
        .and_then(|v| v.downcast::<NSString>().ok())
        .map(|s| s.to_string())
}

/// Observer token returned by `addObserverForName:object:queue:usingBlock:`.
struct ObserverToken(Retained<AnyObject>);

// SAFETY: the token is only ever passed back to NSNotificationCenter's
// removeObserver:, which Apple documents as thread-safe.
unsafe impl Send for ObserverToken {}

// ---------------------------------------------------------------------------
// Platform services
// ---------------------------------------------------------------------------

/// Concrete iOS platform services.
///
/// All methods that touch UIKit require invocation from the main thread.
/// The metadata and audio-session queries may be called from any thread.
pub struct IosPlatform;

impl IosPlatform {
    /// Create a new iOS platform instance.
    pub fn new() -> Self {
        Self
    }
}

impl PlatformServices for IosPlatform {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

// ---------------------------------------------------------------------------
// AppMetadata -- NSBundle
// ---------------------------------------------------------------------------

impl AppMetadata for IosPlatform {
    fn bundle_metadata(&self) -> Result<BundleMetadata> {
        let bundle = NSBundle::mainBundle();
        Ok(BundleMetadata {
            identifier: bundle.bundleIdentifier().map(|s| s.to_string()),
            display_name: info_string(&bundle, "CFBundleDisplayName"),
            short_version: info_string(&bundle, "CFBundleShortVersionString"),
            build_version: info_string(&bundle, "CFBundleVersion"),
        })
    }
}

// ---------------------------------------------------------------------------
// AudioSession -- AVAudioSession
// ---------------------------------------------------------------------------

fn audio_session() -> Result<Retained<AnyObject>> {
    let cls = class(c"AVAudioSession")?;
    // SAFETY: sharedInstance is the documented singleton accessor.
    Ok(unsafe { msg_send![cls, sharedInstance] })
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ExtrasError::Collaborator(format!("invalid audio duration {value}: {e}")))
}

impl AudioSession for IosPlatform {
    fn output_latency(&self) -> Result<Duration> {
        let session = audio_session()?;
        // SAFETY: outputLatency returns an NSTimeInterval (f64).
        seconds(unsafe { msg_send![&session, outputLatency] })
    }

    fn io_buffer_duration(&self) -> Result<Duration> {
        let session = audio_session()?;
        // SAFETY: IOBufferDuration returns an NSTimeInterval (f64).
        seconds(unsafe { msg_send![&session, IOBufferDuration] })
    }
}

// ---------------------------------------------------------------------------
// MuteSwitch -- MuteSwitchDetector (bundled with the host app)
// ---------------------------------------------------------------------------

impl MuteSwitch for IosPlatform {
    /// Uses the app-bundled `MuteSwitchDetector` class, which plays a short
    /// silent sound and reports `(success, silent)` through a block.
    fn check_switch(&self, done: Completion<MuteSwitchReading>) -> Result<()> {
        let _mtm = require_main_thread()?;
        let cls = class(c"MuteSwitchDetector")?;

        let done = Mutex::new(Some(done));
        let block = RcBlock::new(move |success: Bool, silent: Bool| {
            let taken = done.lock().ok().and_then(|mut slot| slot.take());
            if let Some(done) = taken {
                done(MuteSwitchReading {
                    success: success.as_bool(),
                    silent: silent.as_bool(),
                });
            }
        });

        tracing::debug!("iOS: checking mute switch");
        // SAFETY: checkSwitch: takes a void (^)(BOOL success, BOOL silent)
        // block, copied by the callee.
        unsafe {
            let _: () = msg_send![cls, checkSwitch: &*block];
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// IdleTimer -- UIApplication.idleTimerDisabled
// ---------------------------------------------------------------------------

impl IdleTimer for IosPlatform {
    fn set_idle_timer_disabled(&self, disabled: bool) -> Result<()> {
        let mtm = require_main_thread()?;
        let app = UIApplication::sharedApplication(mtm);
        // SAFETY: setIdleTimerDisabled: is a UIApplication property setter;
        // main thread confirmed above.
        unsafe {
            let _: () = msg_send![&app, setIdleTimerDisabled: disabled];
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReviewPrompt -- SKStoreReviewController
// ---------------------------------------------------------------------------

impl ReviewPrompt for IosPlatform {
    /// StoreKit decides whether anything is actually shown. On iOS 14+ the
    /// prompt needs a foreground window scene; without one this is a no-op.
    fn request_review(&self) -> Result<()> {
        let mtm = require_main_thread()?;
        let cls = class(c"SKStoreReviewController")?;

        if cls.class_method(sel!(requestReviewInScene:)).is_some() {
            match foreground_window_scene(mtm) {
                // SAFETY: requestReviewInScene: takes a UIWindowScene.
                Some(scene) => unsafe {
                    let _: () = msg_send![cls, requestReviewInScene: &*scene];
                },
                None => tracing::debug!("iOS: no foreground scene for review prompt"),
            }
        } else {
            // SAFETY: pre-iOS 14 class method with no arguments.
            unsafe {
                let _: () = msg_send![cls, requestReview];
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SubscriptionManager
// ---------------------------------------------------------------------------

impl SubscriptionManager for IosPlatform {
    /// StoreKit 2's manage-subscriptions sheet is Swift-only and has no
    /// Objective-C selector, so callers always take the web fallback here.
    fn show_manage_subscriptions(&self, _done: Completion<Result<()>>) -> Result<()> {
        Err(ExtrasError::PlatformUnavailable)
    }
}

// ---------------------------------------------------------------------------
// UrlOpener -- UIApplication openURL:options:completionHandler:
// ---------------------------------------------------------------------------

impl UrlOpener for IosPlatform {
    fn open_url(&self, url: &Url) -> Result<()> {
        let mtm = require_main_thread()?;
        let ns_url = NSURL::URLWithString(&NSString::from_str(url.as_str()))
            .ok_or_else(|| ExtrasError::Collaborator(format!("NSURL rejected {url}")))?;
        let options = NSDictionary::<NSString, AnyObject>::new();
        let app = UIApplication::sharedApplication(mtm);

        tracing::info!(%url, "iOS: opening URL");
        // SAFETY: openURL:options:completionHandler: with an empty options
        // dictionary and a nil completion handler; main thread confirmed.
        unsafe {
            let _: () = msg_send![
                &app,
                openURL: &*ns_url,
                options: &*options,
                completionHandler: std::ptr::null::<AnyObject>()
            ];
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TextSizePreference -- UIFont / UIContentSizeCategoryDidChangeNotification
// ---------------------------------------------------------------------------

impl TextSizePreference for IosPlatform {
    fn body_point_size(&self) -> Result<f64> {
        let _mtm = require_main_thread()?;
        let cls = class(c"UIFont")?;
        // SAFETY: preferredFontForTextStyle: returns a UIFont for a valid
        // text style constant; pointSize is a CGFloat (f64 on 64-bit iOS).
        let size: f64 = unsafe {
            let font: Retained<AnyObject> =
                msg_send![cls, preferredFontForTextStyle: UIFontTextStyleBody];
            msg_send![&font, pointSize]
        };
        Ok(size)
    }

    fn observe_text_size(&self, notify: ChangeNotifier) -> Result<Teardown> {
        let _mtm = require_main_thread()?;
        let center_cls = class(c"NSNotificationCenter")?;
        let queue_cls = class(c"NSOperationQueue")?;

        let block = RcBlock::new(move |_note: NonNull<NSNotification>| notify());

        // SAFETY: addObserverForName:object:queue:usingBlock: copies the
        // block and returns an opaque observer token that must later be
        // passed to removeObserver:.
        let token: Retained<AnyObject> = unsafe {
            let center: Retained<AnyObject> = msg_send![center_cls, defaultCenter];
            let main_queue: Retained<AnyObject> = msg_send![queue_cls, mainQueue];
            msg_send![
                &center,
                addObserverForName: UIContentSizeCategoryDidChangeNotification,
                object: std::ptr::null::<AnyObject>(),
                queue: &*main_queue,
                usingBlock: &*block
            ]
        };

        tracing::debug!("iOS: observing content size category changes");
        let token = ObserverToken(token);
        Ok(Teardown::new(move || {
            let token = token;
            // SAFETY: removeObserver: with the token obtained above.
            unsafe {
                let center: Retained<AnyObject> = msg_send![center_cls, defaultCenter];
                let _: () = msg_send![&center, removeObserver: &*token.0];
            }
            tracing::debug!("iOS: content size observer removed");
        }))
    }
}

// ---------------------------------------------------------------------------
// ShareSheet -- UIActivityViewController
// ---------------------------------------------------------------------------

impl ShareSheet for IosPlatform {
    /// Present the share sheet with the text and, when given, the URL. The
    /// activity sheet has no title field, so `title` is not shown.
    fn share(&self, item: &ShareItem) -> Result<()> {
        let mtm = require_main_thread()?;

        tracing::info!("iOS: presenting UIActivityViewController");

        let mut items: Vec<Retained<AnyObject>> = Vec::new();
        if !item.text.is_empty() {
            let text = NSString::from_str(&item.text);
            items.push(Retained::into_super(Retained::into_super(text)));
        }
        if let Some(url) = NSURL::URLWithString(&NSString::from_str(&item.url)) {
            items.push(Retained::into_super(Retained::into_super(url)));
        }
        if items.is_empty() {
            return Err(ExtrasError::MalformedArguments("nothing to share".into()));
        }
        let items = NSArray::from_retained_slice(&items);

        // SAFETY: ObjC alloc+init pattern for UIActivityViewController;
        // nil applicationActivities means the system default set.
        let activity_vc: Retained<UIActivityViewController> = unsafe {
            let alloc: Retained<UIActivityViewController> =
                msg_send![objc2::class!(UIActivityViewController), alloc];
            msg_send![
                alloc,
                initWithActivityItems: &*items,
                applicationActivities: std::ptr::null::<AnyObject>()
            ]
        };

        let root_vc = root_view_controller(mtm)?;
        // SAFETY: presentViewController, main thread confirmed above.
        unsafe {
            root_vc.presentViewController_animated_completion(&activity_vc, true, None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_name() {
        assert_eq!(IosPlatform::new().platform_name(), "iOS");
    }

    // UIKit-backed methods need a running app with a key window; they are
    // exercised from the Xcode test target rather than `cargo test`.
}
