// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `adrelay status` command implementation.
//!
//! Opens the configured database read-side and prints listing counts by
//! status and boost flag, as plain text or JSON for scripting.

use adrelay_config::model::AdrelayConfig;
use adrelay_core::types::{ListingStatus, RelayStats};
use adrelay_core::{ListingStore, RelayError};
use adrelay_storage::SqliteStorage;

/// Run the `adrelay status` command.
pub async fn run_status(config: &AdrelayConfig, json: bool) -> Result<(), RelayError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let stats = RelayStats {
        total: storage.count_all().await?,
        active: storage.count_by_status(ListingStatus::Active).await?,
        sent: storage.count_by_status(ListingStatus::Sent).await?,
        deleted: storage.count_by_status(ListingStatus::Deleted).await?,
        error: storage.count_by_status(ListingStatus::Error).await?,
        boosted: storage.count_boosted().await?,
    };

    if json {
        let rendered = serde_json::to_string_pretty(&stats)
            .map_err(|e| RelayError::Internal(format!("failed to render stats: {e}")))?;
        println!("{rendered}");
    } else {
        println!("database: {}", config.storage.database_path);
        println!("total listings: {}", stats.total);
        println!("  active:  {}", stats.active);
        println!("  sent:    {}", stats.sent);
        println!("  deleted: {}", stats.deleted);
        println!("  error:   {}", stats.error);
        println!("  boosted: {}", stats.boosted);
    }

    storage.close().await?;
    Ok(())
}
