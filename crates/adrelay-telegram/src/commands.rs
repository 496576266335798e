// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: parsing and synchronous acknowledgement texts.
//!
//! Every command produces a user-facing reply string; invalid input never
//! reaches the store.

use teloxide::utils::command::BotCommands;

use adrelay_core::types::BoostStatus;
use adrelay_core::RelayError;
use adrelay_engine::Operations;

/// Operator command set, mirrored into the bot command menu.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show relay statistics")]
    Start,
    #[command(description = "boost a listing")]
    Boost(String),
    #[command(description = "clear a listing's boost")]
    Unboost(String),
    #[command(description = "delete a listing and retract its posts")]
    Del(String),
    #[command(description = "enable forwarding")]
    On,
    #[command(description = "disable forwarding")]
    Off,
    #[command(description = "re-read listings from the database")]
    Refresh,
}

/// Execute one operator command, returning the reply text.
pub async fn execute(command: Command, ops: &Operations) -> String {
    match command {
        Command::Start => match ops.stats().await {
            Ok(stats) => format!(
                "relay statistics\n\
                 total listings: {}\n\
                 active: {}\n\
                 sent: {}\n\
                 boosted: {}\n\
                 deleted: {}\n\
                 errors: {}\n\
                 sending: {}",
                stats.total,
                stats.active,
                stats.sent,
                stats.boosted,
                stats.deleted,
                stats.error,
                if ops.control().sending_enabled() {
                    "on"
                } else {
                    "off"
                },
            ),
            Err(e) => format!("failed to read statistics: {e}"),
        },
        Command::Boost(arg) => {
            if arg.trim().is_empty() {
                return "usage: /boost <listing id>".to_string();
            }
            match ops.boost(&arg).await {
                Ok(listing) => format!("listing {} boosted", listing.external_id),
                Err(e) => user_message(&e),
            }
        }
        Command::Unboost(arg) => {
            if arg.trim().is_empty() {
                return "usage: /unboost <listing id>".to_string();
            }
            match ops.unboost(&arg).await {
                Ok(listing) if listing.boost == BoostStatus::Boosted => {
                    format!("listing {} unboosted", listing.external_id)
                }
                Ok(listing) => format!("listing {} is not boosted", listing.external_id),
                Err(e) => user_message(&e),
            }
        }
        Command::Del(arg) => {
            if arg.trim().is_empty() {
                return "usage: /del <listing id>".to_string();
            }
            match ops.delete(&arg).await {
                Ok(listing) => format!("listing {} deleted", listing.external_id),
                Err(e) => user_message(&e),
            }
        }
        Command::On => {
            ops.enable_sending();
            "sending enabled".to_string()
        }
        Command::Off => {
            ops.disable_sending();
            "sending disabled".to_string()
        }
        Command::Refresh => {
            ops.request_refresh();
            "refresh scheduled for the next cycle".to_string()
        }
    }
}

/// Render an operator-facing message for an action error.
fn user_message(error: &RelayError) -> String {
    match error {
        RelayError::InvalidListingId(input) => format!("invalid listing id: {input}"),
        RelayError::ListingNotFound(id) => format!("listing {id} not found"),
        RelayError::InvalidTransition { from, .. } => {
            format!("listing is already {from}")
        }
        other => format!("command failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use adrelay_config::model::StorageConfig;
    use adrelay_core::types::ListingStatus;
    use adrelay_core::ListingStore;
    use adrelay_engine::{ControlState, Dispatcher};
    use adrelay_storage::SqliteStorage;
    use adrelay_test_utils::fixtures::photo_listing;
    use adrelay_test_utils::MockTransport;
    use tempfile::tempdir;

    async fn setup() -> (Arc<SqliteStorage>, Operations, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("commands.db");
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();
        let transport = Arc::new(MockTransport::new());
        let dispatcher = Arc::new(Dispatcher::new(
            storage.clone(),
            transport,
            vec![-2001],
            None,
            &[],
        ));
        let ops = Operations::new(storage.clone(), dispatcher, Arc::new(ControlState::new()));
        (storage, ops, dir)
    }

    #[test]
    fn commands_parse_with_lowercase_names() {
        assert_eq!(Command::parse("/start", "relaybot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/boost ID 7", "relaybot").unwrap(),
            Command::Boost("ID 7".to_string())
        );
        assert_eq!(
            Command::parse("/del 42", "relaybot").unwrap(),
            Command::Del("42".to_string())
        );
        assert_eq!(Command::parse("/off", "relaybot").unwrap(), Command::Off);
        assert!(Command::parse("/unknown", "relaybot").is_err());
    }

    #[tokio::test]
    async fn boost_command_acknowledges() {
        let (storage, ops, _dir) = setup().await;
        storage.insert(&photo_listing("7", -100, 1)).await.unwrap();

        let reply = execute(Command::Boost("7".to_string()), &ops).await;
        assert_eq!(reply, "listing 7 boosted");
    }

    #[tokio::test]
    async fn boost_with_missing_argument_shows_usage() {
        let (_storage, ops, _dir) = setup().await;
        let reply = execute(Command::Boost(String::new()), &ops).await;
        assert!(reply.starts_with("usage:"));
    }

    #[tokio::test]
    async fn boost_unknown_listing_reports_not_found() {
        let (_storage, ops, _dir) = setup().await;
        let reply = execute(Command::Boost("99".to_string()), &ops).await;
        assert_eq!(reply, "listing 99 not found");
    }

    #[tokio::test]
    async fn boost_invalid_id_reports_format_error() {
        let (_storage, ops, _dir) = setup().await;
        let reply = execute(Command::Boost("abc".to_string()), &ops).await;
        assert_eq!(reply, "invalid listing id: abc");
    }

    #[tokio::test]
    async fn unboost_distinguishes_not_boosted() {
        let (storage, ops, _dir) = setup().await;
        storage.insert(&photo_listing("7", -100, 1)).await.unwrap();

        let reply = execute(Command::Unboost("7".to_string()), &ops).await;
        assert_eq!(reply, "listing 7 is not boosted");

        execute(Command::Boost("7".to_string()), &ops).await;
        let reply = execute(Command::Unboost("7".to_string()), &ops).await;
        assert_eq!(reply, "listing 7 unboosted");
    }

    #[tokio::test]
    async fn del_command_deletes_and_acknowledges() {
        let (storage, ops, _dir) = setup().await;
        let id = storage.insert(&photo_listing("7", -100, 1)).await.unwrap();

        let reply = execute(Command::Del("ID 7".to_string()), &ops).await;
        assert_eq!(reply, "listing 7 deleted");
        assert_eq!(
            storage.get(id).await.unwrap().unwrap().status,
            ListingStatus::Deleted
        );
    }

    #[tokio::test]
    async fn toggles_and_refresh_acknowledge() {
        let (_storage, ops, _dir) = setup().await;

        assert_eq!(execute(Command::Off, &ops).await, "sending disabled");
        assert!(!ops.control().sending_enabled());
        assert_eq!(execute(Command::On, &ops).await, "sending enabled");
        assert!(ops.control().sending_enabled());

        let reply = execute(Command::Refresh, &ops).await;
        assert!(reply.contains("refresh"));
        assert!(ops.control().refresh_requested());
    }

    #[tokio::test]
    async fn start_reports_counts_and_sending_state() {
        let (storage, ops, _dir) = setup().await;
        storage.insert(&photo_listing("1", -100, 1)).await.unwrap();
        storage.insert(&photo_listing("2", -100, 2)).await.unwrap();

        let reply = execute(Command::Start, &ops).await;
        assert!(reply.contains("total listings: 2"));
        assert!(reply.contains("active: 2"));
        assert!(reply.contains("sending: on"));
    }
}
