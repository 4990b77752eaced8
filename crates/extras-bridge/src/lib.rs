// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Platform Extras: asynchronous command/callback bridge.
//!
//! The app shell sends named requests through a [`Bridge`] handle. Each is
//! dispatched on a single designated execution context ([`MainLoop`]) to a
//! handler that calls one native service and answers through the shared
//! response stream, either once (terminal) or repeatedly (keep-alive, for
//! watched signals).
//!
//! Native services sit behind the traits in [`traits`]; [`platform_services`]
//! picks the implementation for the target operating system.

pub mod context;
pub mod dispatcher;
pub mod operations;
pub mod registry;
pub mod responder;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(not(target_os = "ios"))]
pub mod stub;

use std::sync::Arc;

pub use context::{Bridge, BridgeContext, MainHandle, MainLoop};
pub use dispatcher::{Arguments, Dispatcher};
pub use registry::{SubscriptionRegistry, Teardown};
pub use responder::{Responder, Responses};

/// Native services for the target operating system.
pub fn platform_services() -> Arc<dyn traits::PlatformServices> {
    #[cfg(target_os = "ios")]
    {
        // iOS: UIKit / AVFoundation / StoreKit through objc2 message sends.
        Arc::new(ios::IosPlatform::new())
    }
    #[cfg(not(target_os = "ios"))]
    {
        // Desktop/CI: every service reports PlatformUnavailable.
        Arc::new(stub::StubPlatform)
    }
}
