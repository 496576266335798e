// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for listing persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BoostStatus, ForwardedRefs, Listing, ListingStatus};

/// Adapter for the durable listing store.
///
/// Each mutation is atomic at single-listing granularity; the store is the
/// only shared mutable resource between ingestion and scheduling.
#[async_trait]
pub trait ListingStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RelayError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RelayError>;

    /// Inserts a new listing and returns its storage id.
    async fn insert(&self, listing: &Listing) -> Result<i64, RelayError>;

    /// Fetches a listing by storage id.
    async fn get(&self, id: i64) -> Result<Option<Listing>, RelayError>;

    /// Finds the newest listing with the given (normalized) external id.
    async fn find_by_external_id(&self, external_id: &str)
        -> Result<Option<Listing>, RelayError>;

    /// Lists listings from one source chat with the given status,
    /// in insertion order.
    async fn list_by_source_and_status(
        &self,
        chat_id: i64,
        status: ListingStatus,
    ) -> Result<Vec<Listing>, RelayError>;

    /// Lists all listings with the given status.
    async fn list_by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, RelayError>;

    /// Lists all currently boosted listings, independent of status.
    async fn list_boosted(&self) -> Result<Vec<Listing>, RelayError>;

    /// Free-text substring match over external id and caption.
    async fn search(&self, query: &str) -> Result<Vec<Listing>, RelayError>;

    /// Sets the lifecycle status of one listing.
    async fn update_status(&self, id: i64, status: ListingStatus) -> Result<(), RelayError>;

    /// Sets the boost flag of one listing.
    async fn set_boost(&self, id: i64, boost: BoostStatus) -> Result<(), RelayError>;

    /// Records delivered destination message ids for one listing.
    async fn set_forwarded(&self, id: i64, refs: &ForwardedRefs) -> Result<(), RelayError>;

    /// Clears recorded destination message ids after reversal.
    async fn clear_forwarded(&self, id: i64) -> Result<(), RelayError>;

    /// Total number of stored listings.
    async fn count_all(&self) -> Result<i64, RelayError>;

    /// Number of listings with the given status.
    async fn count_by_status(&self, status: ListingStatus) -> Result<i64, RelayError>;

    /// Number of boosted listings.
    async fn count_boosted(&self) -> Result<i64, RelayError>;

    /// Bulk-reverts all `Sent` listings to `Active`. Returns the number of
    /// listings recycled.
    async fn recycle_sent(&self) -> Result<u64, RelayError>;

    /// Permanently removes a listing row.
    async fn delete(&self, id: i64) -> Result<(), RelayError>;
}
