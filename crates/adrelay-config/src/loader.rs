// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./adrelay.toml` > `~/.config/adrelay/adrelay.toml` > `/etc/adrelay/adrelay.toml`
//! with environment variable overrides via `ADRELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AdrelayConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/adrelay/adrelay.toml` (system-wide)
/// 3. `~/.config/adrelay/adrelay.toml` (user XDG config)
/// 4. `./adrelay.toml` (local directory)
/// 5. `ADRELAY_*` environment variables
pub fn load_config() -> Result<AdrelayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<AdrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdrelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AdrelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdrelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AdrelayConfig::default()))
        .merge(Toml::file("/etc/adrelay/adrelay.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("adrelay/adrelay.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("adrelay.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `ADRELAY_TELEGRAM_BOT_TOKEN` must
/// map to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("ADRELAY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: ADRELAY_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("relay_", "relay.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
