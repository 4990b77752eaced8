// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform Extras: request/response model, errors and configuration shared
// by the bridge and its hosts.

pub mod config;
pub mod error;
pub mod types;

pub use config::BridgeConfig;
pub use error::ExtrasError;
pub use types::*;

/// Version of the caller-facing command surface.
pub const API_VERSION: u32 = 2;
