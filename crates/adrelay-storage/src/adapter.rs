// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ListingStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use adrelay_config::model::StorageConfig;
use adrelay_core::types::{BoostStatus, ForwardedRefs, Listing, ListingStatus};
use adrelay_core::{AdapterType, HealthStatus, ListingStore, PluginAdapter, RelayError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed listing store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query module. The database is lazily initialized on the first
/// call to [`ListingStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`ListingStore::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, RelayError> {
        self.db.get().ok_or_else(|| RelayError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), RelayError> {
        let path = self.config.database_path.clone();
        let db = Database::open(&path).await?;
        self.db.set(db).map_err(|_| RelayError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RelayError> {
        self.db()?.close().await
    }

    async fn insert(&self, listing: &Listing) -> Result<i64, RelayError> {
        queries::listings::insert_listing(self.db()?, listing).await
    }

    async fn get(&self, id: i64) -> Result<Option<Listing>, RelayError> {
        queries::listings::get_listing(self.db()?, id).await
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Listing>, RelayError> {
        queries::listings::find_by_external_id(self.db()?, external_id).await
    }

    async fn list_by_source_and_status(
        &self,
        chat_id: i64,
        status: ListingStatus,
    ) -> Result<Vec<Listing>, RelayError> {
        queries::listings::list_by_source_and_status(self.db()?, chat_id, status).await
    }

    async fn list_by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, RelayError> {
        queries::listings::list_by_status(self.db()?, status).await
    }

    async fn list_boosted(&self) -> Result<Vec<Listing>, RelayError> {
        queries::listings::list_boosted(self.db()?).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Listing>, RelayError> {
        queries::listings::search(self.db()?, query).await
    }

    async fn update_status(&self, id: i64, status: ListingStatus) -> Result<(), RelayError> {
        queries::listings::update_status(self.db()?, id, status).await
    }

    async fn set_boost(&self, id: i64, boost: BoostStatus) -> Result<(), RelayError> {
        queries::listings::set_boost(self.db()?, id, boost).await
    }

    async fn set_forwarded(&self, id: i64, refs: &ForwardedRefs) -> Result<(), RelayError> {
        queries::listings::set_forwarded(self.db()?, id, refs).await
    }

    async fn clear_forwarded(&self, id: i64) -> Result<(), RelayError> {
        queries::listings::clear_forwarded(self.db()?, id).await
    }

    async fn count_all(&self) -> Result<i64, RelayError> {
        queries::listings::count_all(self.db()?).await
    }

    async fn count_by_status(&self, status: ListingStatus) -> Result<i64, RelayError> {
        queries::listings::count_by_status(self.db()?, status).await
    }

    async fn count_boosted(&self) -> Result<i64, RelayError> {
        queries::listings::count_boosted(self.db()?).await
    }

    async fn recycle_sent(&self) -> Result<u64, RelayError> {
        queries::listings::recycle_sent(self.db()?).await
    }

    async fn delete(&self, id: i64) -> Result<(), RelayError> {
        queries::listings::delete_listing(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrelay_core::types::SourceRef;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn make_listing(external_id: &str) -> Listing {
        Listing::new(
            external_id.to_string(),
            SourceRef {
                chat_id: -100,
                message_id: 1,
            },
            None,
            vec![],
            Some(format!("ID {external_id}")),
            "2026-01-01T00:00:00.000Z".to_string(),
        )
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        let result = storage.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn full_listing_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        // Insert and retrieve.
        let id = storage.insert(&make_listing("42")).await.unwrap();
        let stored = storage.get(id).await.unwrap().unwrap();
        assert_eq!(stored.external_id, "42");
        assert_eq!(stored.status, ListingStatus::Active);

        // Dispatch effects.
        let mut refs = ForwardedRefs::new();
        refs.insert("-1002".to_string(), vec![900]);
        storage.set_forwarded(id, &refs).await.unwrap();
        storage.update_status(id, ListingStatus::Sent).await.unwrap();

        let sent = storage.get(id).await.unwrap().unwrap();
        assert_eq!(sent.status, ListingStatus::Sent);
        assert_eq!(sent.forwarded, refs);

        // Recycling makes it eligible again.
        assert_eq!(storage.count_by_status(ListingStatus::Active).await.unwrap(), 0);
        assert_eq!(storage.recycle_sent().await.unwrap(), 1);
        assert_eq!(storage.count_by_status(ListingStatus::Active).await.unwrap(), 1);

        // Boost flag is orthogonal.
        storage.set_boost(id, BoostStatus::Boosted).await.unwrap();
        assert_eq!(storage.count_boosted().await.unwrap(), 1);
        assert_eq!(storage.list_boosted().await.unwrap().len(), 1);

        // Reversal clears refs.
        storage.clear_forwarded(id).await.unwrap();
        let cleared = storage.get(id).await.unwrap().unwrap();
        assert!(cleared.forwarded.is_empty());

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.insert(&make_listing("1")).await.unwrap();

        // Shutdown should succeed.
        storage.shutdown().await.unwrap();
    }
}
