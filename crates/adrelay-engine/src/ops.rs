// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator actions exposed to front ends (chat commands, HTTP, ...).
//!
//! Every action validates its input synchronously and returns a typed
//! error for the front end to render; invalid ids never reach a store
//! mutation. Reversal of dispatch effects accompanies boost-off and delete.

use std::sync::Arc;

use tracing::{error, info};

use adrelay_core::types::{BoostStatus, Listing, ListingStatus, RelayStats};
use adrelay_core::{ListingStore, RelayError};

use crate::control::ControlState;
use crate::dispatch::Dispatcher;
use crate::lifecycle;

/// Normalize an operator-supplied listing id.
///
/// Accepts `"1234"`, `"ID 1234"`, `"id:0042"` and similar forms; returns
/// the canonical digits with leading zeros stripped.
pub fn parse_listing_id(input: &str) -> Result<String, RelayError> {
    let trimmed = input.trim();
    let rest = if trimmed.len() >= 2
        && trimmed.is_char_boundary(2)
        && trimmed[..2].eq_ignore_ascii_case("id")
    {
        trimmed[2..].trim_matches([' ', ':', '_', '-'])
    } else {
        trimmed
    };
    rest.parse::<u64>()
        .map(|n| n.to_string())
        .map_err(|_| RelayError::InvalidListingId(trimmed.to_string()))
}

/// The operator-facing surface of the relay core.
pub struct Operations {
    store: Arc<dyn ListingStore>,
    dispatcher: Arc<Dispatcher>,
    control: Arc<ControlState>,
}

impl Operations {
    pub fn new(
        store: Arc<dyn ListingStore>,
        dispatcher: Arc<Dispatcher>,
        control: Arc<ControlState>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            control,
        }
    }

    pub fn control(&self) -> &Arc<ControlState> {
        &self.control
    }

    async fn lookup(&self, raw_id: &str) -> Result<Listing, RelayError> {
        let external_id = parse_listing_id(raw_id)?;
        self.store
            .find_by_external_id(&external_id)
            .await?
            .ok_or(RelayError::ListingNotFound(external_id))
    }

    /// Mark a listing boosted. Returns the listing as it was before the
    /// toggle.
    pub async fn boost(&self, raw_id: &str) -> Result<Listing, RelayError> {
        let listing = self.lookup(raw_id).await?;
        self.store.set_boost(listing.id, BoostStatus::Boosted).await?;
        info!(external_id = %listing.external_id, "listing boosted");
        Ok(listing)
    }

    /// Clear a listing's boost flag, reversing any recorded dispatch
    /// effects first. Returns the listing as it was before the toggle; a
    /// listing that was not boosted is left untouched.
    pub async fn unboost(&self, raw_id: &str) -> Result<Listing, RelayError> {
        let listing = self.lookup(raw_id).await?;
        if listing.boost == BoostStatus::Boosted {
            self.dispatcher.retract(&listing).await?;
            self.store
                .set_boost(listing.id, BoostStatus::Unboosted)
                .await?;
            info!(external_id = %listing.external_id, "listing unboosted");
        }
        Ok(listing)
    }

    /// Delete a listing: reverse recorded dispatch effects, retract the
    /// original source message (best effort), and mark it `Deleted`.
    pub async fn delete(&self, raw_id: &str) -> Result<Listing, RelayError> {
        let listing = self.lookup(raw_id).await?;
        lifecycle::check_transition(listing.status, ListingStatus::Deleted)?;

        self.dispatcher.retract(&listing).await?;

        if let Err(e) = self
            .dispatcher
            .transport()
            .delete_message(listing.source.chat_id, listing.source.message_id)
            .await
        {
            error!(
                external_id = %listing.external_id,
                error = %e,
                "failed to retract source message"
            );
        }

        self.store
            .update_status(listing.id, ListingStatus::Deleted)
            .await?;
        info!(external_id = %listing.external_id, "listing deleted");
        Ok(listing)
    }

    pub fn enable_sending(&self) {
        self.control.set_sending(true);
        info!("sending enabled");
    }

    pub fn disable_sending(&self) {
        self.control.set_sending(false);
        info!("sending disabled");
    }

    pub fn request_refresh(&self) {
        self.control.request_refresh();
        info!("refresh requested");
    }

    /// Counts by status and boost flag.
    pub async fn stats(&self) -> Result<RelayStats, RelayError> {
        Ok(RelayStats {
            total: self.store.count_all().await?,
            active: self.store.count_by_status(ListingStatus::Active).await?,
            sent: self.store.count_by_status(ListingStatus::Sent).await?,
            deleted: self.store.count_by_status(ListingStatus::Deleted).await?,
            error: self.store.count_by_status(ListingStatus::Error).await?,
            boosted: self.store.count_boosted().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrelay_config::model::StorageConfig;
    use adrelay_core::types::ForwardedRefs;
    use adrelay_core::ListingStore as _;
    use adrelay_storage::SqliteStorage;
    use adrelay_test_utils::fixtures::photo_listing;
    use adrelay_test_utils::MockTransport;
    use tempfile::tempdir;

    struct Harness {
        storage: Arc<SqliteStorage>,
        transport: Arc<MockTransport>,
        ops: Operations,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> Harness {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("ops.db");
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();
        let transport = Arc::new(MockTransport::new());
        let dispatcher = Arc::new(Dispatcher::new(
            storage.clone(),
            transport.clone(),
            vec![-2001],
            None,
            &[],
        ));
        let control = Arc::new(ControlState::new());
        let ops = Operations::new(storage.clone(), dispatcher, control);
        Harness {
            storage,
            transport,
            ops,
            _dir: dir,
        }
    }

    #[test]
    fn parse_listing_id_accepts_common_forms() {
        assert_eq!(parse_listing_id("1234").unwrap(), "1234");
        assert_eq!(parse_listing_id("ID 1234").unwrap(), "1234");
        assert_eq!(parse_listing_id("id:42").unwrap(), "42");
        assert_eq!(parse_listing_id(" Id-0042 ").unwrap(), "42");
        assert_eq!(parse_listing_id("007").unwrap(), "7");
    }

    #[test]
    fn parse_listing_id_rejects_garbage() {
        assert!(matches!(
            parse_listing_id("abc"),
            Err(RelayError::InvalidListingId(_))
        ));
        assert!(matches!(
            parse_listing_id(""),
            Err(RelayError::InvalidListingId(_))
        ));
        assert!(matches!(
            parse_listing_id("ID"),
            Err(RelayError::InvalidListingId(_))
        ));
        assert!(matches!(
            parse_listing_id("-5"),
            Err(RelayError::InvalidListingId(_))
        ));
    }

    #[tokio::test]
    async fn boost_sets_the_flag() {
        let harness = setup().await;
        let id = harness
            .storage
            .insert(&photo_listing("7", -100, 1))
            .await
            .unwrap();

        harness.ops.boost("ID 7").await.unwrap();

        let listing = harness.storage.get(id).await.unwrap().unwrap();
        assert_eq!(listing.boost, BoostStatus::Boosted);
    }

    #[tokio::test]
    async fn boost_unknown_id_is_rejected_without_store_changes() {
        let harness = setup().await;
        let err = harness.ops.boost("99").await.unwrap_err();
        assert!(matches!(err, RelayError::ListingNotFound(id) if id == "99"));
    }

    #[tokio::test]
    async fn unboost_reverses_dispatch_effects() {
        let harness = setup().await;
        let mut listing = photo_listing("7", -100, 1);
        listing.id = harness.storage.insert(&listing).await.unwrap();

        let mut refs = ForwardedRefs::new();
        refs.insert("-2001".to_string(), vec![900, 901]);
        harness
            .storage
            .set_forwarded(listing.id, &refs)
            .await
            .unwrap();
        harness
            .storage
            .set_boost(listing.id, BoostStatus::Boosted)
            .await
            .unwrap();

        harness.ops.unboost("7").await.unwrap();

        let stored = harness.storage.get(listing.id).await.unwrap().unwrap();
        assert_eq!(stored.boost, BoostStatus::Unboosted);
        assert!(stored.forwarded.is_empty());
        assert_eq!(
            harness.transport.deletes().await,
            vec![(-2001, 900), (-2001, 901)]
        );
    }

    #[tokio::test]
    async fn unboost_of_unboosted_listing_is_a_no_op() {
        let harness = setup().await;
        let mut listing = photo_listing("7", -100, 1);
        listing.id = harness.storage.insert(&listing).await.unwrap();

        let before = harness.ops.unboost("7").await.unwrap();
        assert_eq!(before.boost, BoostStatus::Unboosted);
        assert!(harness.transport.deletes().await.is_empty());
    }

    #[tokio::test]
    async fn delete_retracts_everything_and_marks_deleted() {
        let harness = setup().await;
        let mut listing = photo_listing("7", -100, 5);
        listing.id = harness.storage.insert(&listing).await.unwrap();

        let mut refs = ForwardedRefs::new();
        refs.insert("-2001".to_string(), vec![900]);
        harness
            .storage
            .set_forwarded(listing.id, &refs)
            .await
            .unwrap();

        harness.ops.delete("ID 7").await.unwrap();

        let stored = harness.storage.get(listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Deleted);
        assert!(stored.forwarded.is_empty());
        // Destination message plus the original source message.
        let deletes = harness.transport.deletes().await;
        assert!(deletes.contains(&(-2001, 900)));
        assert!(deletes.contains(&(-100, 5)));
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_retractions_fail() {
        let harness = setup().await;
        let mut listing = photo_listing("7", -100, 5);
        listing.id = harness.storage.insert(&listing).await.unwrap();

        let mut refs = ForwardedRefs::new();
        refs.insert("-2001".to_string(), vec![900]);
        harness
            .storage
            .set_forwarded(listing.id, &refs)
            .await
            .unwrap();

        harness.transport.set_fail_deletes(true);
        harness.ops.delete("7").await.unwrap();

        let stored = harness.storage.get(listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ListingStatus::Deleted);
        assert!(stored.forwarded.is_empty());
    }

    #[tokio::test]
    async fn delete_of_deleted_listing_is_rejected() {
        let harness = setup().await;
        let mut listing = photo_listing("7", -100, 5);
        listing.id = harness.storage.insert(&listing).await.unwrap();
        harness.ops.delete("7").await.unwrap();

        let err = harness.ops.delete("7").await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn sending_toggles_and_refresh_reach_control_state() {
        let harness = setup().await;
        let control = harness.ops.control().clone();

        harness.ops.disable_sending();
        assert!(!control.sending_enabled());
        harness.ops.enable_sending();
        assert!(control.sending_enabled());

        harness.ops.request_refresh();
        assert!(control.take_refresh());
    }

    #[tokio::test]
    async fn stats_count_by_status_and_boost() {
        let harness = setup().await;
        let a = harness
            .storage
            .insert(&photo_listing("1", -100, 1))
            .await
            .unwrap();
        let b = harness
            .storage
            .insert(&photo_listing("2", -100, 2))
            .await
            .unwrap();
        harness
            .storage
            .insert(&photo_listing("3", -100, 3))
            .await
            .unwrap();
        harness
            .storage
            .update_status(a, ListingStatus::Sent)
            .await
            .unwrap();
        harness
            .storage
            .set_boost(b, BoostStatus::Boosted)
            .await
            .unwrap();

        let stats = harness.ops.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.error, 0);
        assert_eq!(stats.boosted, 1);
    }
}
