// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use serde::{Deserialize, Serialize};

/// Web page opened when the native subscription manager cannot be shown.
pub const DEFAULT_SUBSCRIPTIONS_URL: &str = "https://apps.apple.com/account/subscriptions";

/// Point size of the body text style at the default content size category.
pub const DEFAULT_BODY_POINT_SIZE: f64 = 17.0;

/// Tunable bridge behaviour. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Fallback for `manageSubscriptions` when no native sheet is available.
    pub subscriptions_fallback_url: String,
    /// Divisor turning the current body point size into a scale ratio.
    pub default_body_point_size: f64,
    /// Answer `openURL` with a failure for unparseable URLs (otherwise a
    /// logged no-op acknowledgement).
    pub reject_malformed_urls: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            subscriptions_fallback_url: DEFAULT_SUBSCRIPTIONS_URL.to_string(),
            default_body_point_size: DEFAULT_BODY_POINT_SIZE,
            reject_malformed_urls: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: BridgeConfig =
            serde_json::from_str(r#"{"reject_malformed_urls": false}"#).unwrap();
        assert!(!cfg.reject_malformed_urls);
        assert_eq!(cfg.subscriptions_fallback_url, DEFAULT_SUBSCRIPTIONS_URL);
        assert_eq!(cfg.default_body_point_size, DEFAULT_BODY_POINT_SIZE);
    }
}
