// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Environment variable overrides, applied on top of the merged TOML layers.
//!
//! | variable | effect |
//! |---|---|
//! | `ANTHROPIC_BASE_URL` | `model.base_url` |
//! | `FIMCODE_MODEL` | `model.name` |
//! | `FIMCODE_MAX_TOKENS` | `model.max_tokens` (ignored unless an integer) |
//! | `FIMCODE_LOG_LEVEL` | `logging.level` |
//! | `FIMCODE_ENABLE_FILE_LOG` | `logging.file` (`false` disables) |
//!
//! `ANTHROPIC_AUTH_TOKEN` is not copied into the config; it is the default
//! `model.api_key_env` and is read when the provider is constructed.

use tracing::warn;

use crate::Config;

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    apply_env_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using an arbitrary lookup function.
pub fn apply_env_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("ANTHROPIC_BASE_URL") {
        config.model.base_url = Some(url);
    }
    if let Some(name) = get("FIMCODE_MODEL") {
        config.model.name = name;
    }
    if let Some(raw) = get("FIMCODE_MAX_TOKENS") {
        match raw.trim().parse::<u32>() {
            Ok(n) => config.model.max_tokens = n,
            Err(_) => warn!(value = %raw, "ignoring non-numeric FIMCODE_MAX_TOKENS"),
        }
    }
    if let Some(level) = get("FIMCODE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(flag) = get("FIMCODE_ENABLE_FILE_LOG") {
        config.logging.file = flag.trim() != "false";
    }
}

/// Human-readable warnings about missing connection settings.
///
/// Returned rather than logged because configuration is loaded before the
/// logging subscriber exists.
pub fn env_warnings(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.model.provider != "anthropic" {
        return warnings;
    }
    if config.model.base_url.is_none() {
        warnings.push("ANTHROPIC_BASE_URL 未设置".to_string());
    }
    let has_key = config.model.api_key.is_some()
        || config
            .model
            .api_key_env
            .as_deref()
            .and_then(&lookup)
            .is_some_and(|v| !v.is_empty());
    if !has_key {
        let var = config.model.api_key_env.as_deref().unwrap_or("ANTHROPIC_AUTH_TOKEN");
        warnings.push(format!("{var} 未设置"));
    }
    warnings
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
