// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration persisted as JSON in the data directory.

use std::path::Path;

use extras_core::BridgeConfig;
use extras_core::error::Result;

pub const CONFIG_FILE: &str = "extras.json";

/// Load `extras.json` from `data_dir`. A missing or unreadable file yields
/// the defaults; fields absent from the file keep their default values.
pub fn load_config(data_dir: &Path) -> BridgeConfig {
    let path = data_dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no config file, using defaults");
            return BridgeConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            BridgeConfig::default()
        }
    }
}

pub fn persist_config(data_dir: &Path, config: &BridgeConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.default_body_point_size, 17.0);
        assert!(config.reject_malformed_urls);
    }

    #[test]
    fn persisted_config_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig {
            subscriptions_fallback_url: "https://example.com/billing".into(),
            reject_malformed_urls: false,
            ..Default::default()
        };
        persist_config(dir.path(), &config).unwrap();

        let loaded = load_config(dir.path());
        assert_eq!(loaded.subscriptions_fallback_url, "https://example.com/billing");
        assert!(!loaded.reject_malformed_urls);
        assert_eq!(loaded.default_body_point_size, 17.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"default_body_point_size": 16.0}"#)
            .unwrap();

        let loaded = load_config(dir.path());
        assert_eq!(loaded.default_body_point_size, 16.0);
        assert!(loaded.reject_malformed_urls);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();

        let loaded = load_config(dir.path());
        assert_eq!(loaded.default_body_point_size, 17.0);
    }
}
