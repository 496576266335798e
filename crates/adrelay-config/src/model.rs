// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the adrelay relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level adrelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdrelayConfig {
    /// Forwarding loop and ingestion settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Forwarding loop and ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pacing interval in seconds between outbound dispatches and between
    /// scheduler cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Boost cadence: every Nth dispatched listing triggers a re-send of
    /// all boosted listings.
    #[serde(default = "default_boost_every")]
    pub boost_every: u64,

    /// Grace delay in seconds before a buffered media group is finalized.
    #[serde(default = "default_media_group_grace_secs")]
    pub media_group_grace_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            interval_secs: default_interval_secs(),
            boost_every: default_boost_every(),
            media_group_grace_secs: default_media_group_grace_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval_secs() -> u64 {
    30
}

fn default_boost_every() -> u64 {
    5
}

fn default_media_group_grace_secs() -> u64 {
    2
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram transport.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Operator user ids allowed to issue commands.
    #[serde(default)]
    pub admin_ids: Vec<i64>,

    /// Chats whose posts are ingested as listings.
    #[serde(default)]
    pub source_chats: Vec<i64>,

    /// Chats listings are dispatched to.
    #[serde(default)]
    pub target_chats: Vec<i64>,

    /// Chat receiving dispatch failure notices. Defaults to the first
    /// admin id when unset.
    #[serde(default)]
    pub notify_chat: Option<i64>,

    /// Cross-promotional links appended below captions at send time.
    #[serde(default)]
    pub footer_links: Vec<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("adrelay").join("adrelay.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("adrelay.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
