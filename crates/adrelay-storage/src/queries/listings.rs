// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing CRUD and lifecycle queries.

use adrelay_core::types::{BoostStatus, ForwardedRefs, Listing, ListingStatus, SourceRef};
use adrelay_core::RelayError;
use rusqlite::params;
use tracing::error;

use crate::database::Database;

const COLUMNS: &str = "id, external_id, source_chat_id, source_message_id, status, boost, \
                       media_group_id, media, caption, forwarded, created_at";

/// Map one row to a [`Listing`].
///
/// Malformed JSON in the `media` or `forwarded` columns is degraded to an
/// empty value with an error log; a malformed status or boost string is a
/// hard conversion failure.
fn row_to_listing(row: &rusqlite::Row<'_>) -> Result<Listing, rusqlite::Error> {
    let id: i64 = row.get(0)?;

    let status: String = row.get(4)?;
    let status = status.parse::<ListingStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let boost: String = row.get(5)?;
    let boost = boost.parse::<BoostStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let media_json: String = row.get(7)?;
    let media = serde_json::from_str(&media_json).unwrap_or_else(|e| {
        error!(listing_id = id, error = %e, "malformed media column, treating as empty");
        Vec::new()
    });

    let forwarded_json: Option<String> = row.get(9)?;
    let forwarded = match forwarded_json {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            error!(listing_id = id, error = %e, "malformed forwarded column, treating as empty");
            ForwardedRefs::new()
        }),
        None => ForwardedRefs::new(),
    };

    Ok(Listing {
        id,
        external_id: row.get(1)?,
        source: SourceRef {
            chat_id: row.get(2)?,
            message_id: row.get(3)?,
        },
        status,
        boost,
        media_group_id: row.get(6)?,
        media,
        caption: row.get(8)?,
        forwarded,
        created_at: row.get(10)?,
    })
}

/// Insert a new listing. Returns the auto-generated row id.
pub async fn insert_listing(db: &Database, listing: &Listing) -> Result<i64, RelayError> {
    let listing = listing.clone();
    let media_json = serde_json::to_string(&listing.media).map_err(crate::database::map_tr_err)?;
    let forwarded_json = if listing.forwarded.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&listing.forwarded).map_err(crate::database::map_tr_err)?)
    };
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO listings (external_id, source_chat_id, source_message_id, status, \
                 boost, media_group_id, media, caption, forwarded, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    listing.external_id,
                    listing.source.chat_id,
                    listing.source.message_id,
                    listing.status.to_string(),
                    listing.boost.to_string(),
                    listing.media_group_id,
                    media_json,
                    listing.caption,
                    forwarded_json,
                    listing.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one listing by row id.
pub async fn get_listing(db: &Database, id: i64) -> Result<Option<Listing>, RelayError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM listings WHERE id = ?1"))?;
            match stmt.query_row(params![id], row_to_listing) {
                Ok(listing) => Ok(Some(listing)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the newest listing with the given external id.
///
/// Stale duplicates may exist across lifecycle resets; the newest row is the
/// one in the active working set.
pub async fn find_by_external_id(
    db: &Database,
    external_id: &str,
) -> Result<Option<Listing>, RelayError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM listings WHERE external_id = ?1 ORDER BY id DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![external_id], row_to_listing) {
                Ok(listing) => Ok(Some(listing)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Listings from one source chat with the given status, in insertion order.
pub async fn list_by_source_and_status(
    db: &Database,
    chat_id: i64,
    status: ListingStatus,
) -> Result<Vec<Listing>, RelayError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Listing>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM listings \
                 WHERE source_chat_id = ?1 AND status = ?2 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![chat_id, status.to_string()], row_to_listing)?;
            let mut listings = Vec::new();
            for row in rows {
                listings.push(row?);
            }
            Ok(listings)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All listings with the given status, in insertion order.
pub async fn list_by_status(
    db: &Database,
    status: ListingStatus,
) -> Result<Vec<Listing>, RelayError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Listing>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM listings WHERE status = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![status.to_string()], row_to_listing)?;
            let mut listings = Vec::new();
            for row in rows {
                listings.push(row?);
            }
            Ok(listings)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All boosted listings, independent of status.
pub async fn list_boosted(db: &Database) -> Result<Vec<Listing>, RelayError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Listing>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM listings WHERE boost = 'boosted' ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_listing)?;
            let mut listings = Vec::new();
            for row in rows {
                listings.push(row?);
            }
            Ok(listings)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Substring match over external id and caption, newest first.
pub async fn search(db: &Database, query: &str) -> Result<Vec<Listing>, RelayError> {
    let pattern = format!("%{query}%");
    db.connection()
        .call(move |conn| -> Result<Vec<Listing>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM listings \
                 WHERE external_id LIKE ?1 OR caption LIKE ?1 ORDER BY id DESC"
            ))?;
            let rows = stmt.query_map(params![pattern], row_to_listing)?;
            let mut listings = Vec::new();
            for row in rows {
                listings.push(row?);
            }
            Ok(listings)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the lifecycle status of one listing.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: ListingStatus,
) -> Result<(), RelayError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE listings SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the boost flag of one listing.
pub async fn set_boost(db: &Database, id: i64, boost: BoostStatus) -> Result<(), RelayError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE listings SET boost = ?1 WHERE id = ?2",
                params![boost.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record delivered destination message ids for one listing.
pub async fn set_forwarded(
    db: &Database,
    id: i64,
    refs: &ForwardedRefs,
) -> Result<(), RelayError> {
    let json = serde_json::to_string(refs).map_err(crate::database::map_tr_err)?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE listings SET forwarded = ?1 WHERE id = ?2",
                params![json, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Clear recorded destination message ids after reversal.
pub async fn clear_forwarded(db: &Database, id: i64) -> Result<(), RelayError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE listings SET forwarded = NULL WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of stored listings.
pub async fn count_all(db: &Database) -> Result<i64, RelayError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of listings with the given status.
pub async fn count_by_status(db: &Database, status: ListingStatus) -> Result<i64, RelayError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM listings WHERE status = ?1",
                params![status.to_string()],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of boosted listings.
pub async fn count_boosted(db: &Database) -> Result<i64, RelayError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM listings WHERE boost = 'boosted'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bulk-revert all `sent` listings to `active`. Returns the number recycled.
pub async fn recycle_sent(db: &Database) -> Result<u64, RelayError> {
    db.connection()
        .call(|conn| -> Result<u64, rusqlite::Error> {
            let changed =
                conn.execute("UPDATE listings SET status = 'active' WHERE status = 'sent'", [])?;
            Ok(changed as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Permanently remove a listing row.
pub async fn delete_listing(db: &Database, id: i64) -> Result<(), RelayError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM listings WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrelay_core::types::{MediaItem, MediaKind};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_listing(external_id: &str, chat_id: i64) -> Listing {
        Listing::new(
            external_id.to_string(),
            SourceRef {
                chat_id,
                message_id: 100,
            },
            Some("grp-1".to_string()),
            vec![
                MediaItem {
                    kind: MediaKind::Photo,
                    file_id: "photo-1".into(),
                },
                MediaItem {
                    kind: MediaKind::Video,
                    file_id: "video-1".into(),
                },
            ],
            Some("two rooms, ID 7".to_string()),
            "2026-01-01T00:00:00Z".to_string(),
        )
    }

    #[tokio::test]
    async fn insert_and_get_round_trips_all_fields() {
        let (db, _dir) = setup_db().await;

        let listing = make_listing("7", -100);
        let id = insert_listing(&db, &listing).await.unwrap();
        assert!(id > 0);

        let stored = get_listing(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.external_id, "7");
        assert_eq!(stored.source.chat_id, -100);
        assert_eq!(stored.source.message_id, 100);
        assert_eq!(stored.status, ListingStatus::Active);
        assert_eq!(stored.boost, BoostStatus::Unboosted);
        assert_eq!(stored.media_group_id.as_deref(), Some("grp-1"));
        assert_eq!(stored.media.len(), 2);
        assert_eq!(stored.media[0].kind, MediaKind::Photo);
        assert_eq!(stored.media[1].file_id, "video-1");
        assert_eq!(stored.caption.as_deref(), Some("two rooms, ID 7"));
        assert!(stored.forwarded.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_listing_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_listing(&db, 999).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_by_external_id_returns_newest_duplicate() {
        let (db, _dir) = setup_db().await;

        let first = insert_listing(&db, &make_listing("7", -100)).await.unwrap();
        let second = insert_listing(&db, &make_listing("7", -200)).await.unwrap();
        assert!(second > first);

        let found = find_by_external_id(&db, "7").await.unwrap().unwrap();
        assert_eq!(found.id, second);
        assert_eq!(found.source.chat_id, -200);

        assert!(find_by_external_id(&db, "8").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_source_and_status_filters_both() {
        let (db, _dir) = setup_db().await;

        let a = insert_listing(&db, &make_listing("1", -100)).await.unwrap();
        let b = insert_listing(&db, &make_listing("2", -100)).await.unwrap();
        let _other_chat = insert_listing(&db, &make_listing("3", -200)).await.unwrap();
        update_status(&db, b, ListingStatus::Sent).await.unwrap();

        let active = list_by_source_and_status(&db, -100, ListingStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a);

        let sent = list_by_source_and_status(&db, -100, ListingStatus::Sent)
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, b);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_boosted_is_independent_of_status() {
        let (db, _dir) = setup_db().await;

        let a = insert_listing(&db, &make_listing("1", -100)).await.unwrap();
        let b = insert_listing(&db, &make_listing("2", -100)).await.unwrap();
        set_boost(&db, a, BoostStatus::Boosted).await.unwrap();
        set_boost(&db, b, BoostStatus::Boosted).await.unwrap();
        update_status(&db, b, ListingStatus::Sent).await.unwrap();

        let boosted = list_boosted(&db).await.unwrap();
        assert_eq!(boosted.len(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn forwarded_refs_set_and_clear() {
        let (db, _dir) = setup_db().await;

        let id = insert_listing(&db, &make_listing("7", -100)).await.unwrap();

        let mut refs = ForwardedRefs::new();
        refs.insert("-1002".into(), vec![501, 502]);
        set_forwarded(&db, id, &refs).await.unwrap();

        let stored = get_listing(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.forwarded, refs);

        clear_forwarded(&db, id).await.unwrap();
        let cleared = get_listing(&db, id).await.unwrap().unwrap();
        assert!(cleared.forwarded.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_forwarded_column_degrades_to_empty() {
        let (db, _dir) = setup_db().await;

        let id = insert_listing(&db, &make_listing("7", -100)).await.unwrap();
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE listings SET forwarded = 'not json' WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let stored = get_listing(&db, id).await.unwrap().unwrap();
        assert!(stored.forwarded.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recycle_sent_reverts_only_sent() {
        let (db, _dir) = setup_db().await;

        let a = insert_listing(&db, &make_listing("1", -100)).await.unwrap();
        let b = insert_listing(&db, &make_listing("2", -100)).await.unwrap();
        let c = insert_listing(&db, &make_listing("3", -100)).await.unwrap();
        update_status(&db, a, ListingStatus::Sent).await.unwrap();
        update_status(&db, b, ListingStatus::Sent).await.unwrap();
        update_status(&db, c, ListingStatus::Deleted).await.unwrap();

        let recycled = recycle_sent(&db).await.unwrap();
        assert_eq!(recycled, 2);

        assert_eq!(count_by_status(&db, ListingStatus::Active).await.unwrap(), 2);
        assert_eq!(count_by_status(&db, ListingStatus::Sent).await.unwrap(), 0);
        assert_eq!(
            count_by_status(&db, ListingStatus::Deleted).await.unwrap(),
            1
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counts_track_status_and_boost() {
        let (db, _dir) = setup_db().await;

        let a = insert_listing(&db, &make_listing("1", -100)).await.unwrap();
        let _b = insert_listing(&db, &make_listing("2", -100)).await.unwrap();
        set_boost(&db, a, BoostStatus::Boosted).await.unwrap();

        assert_eq!(count_all(&db).await.unwrap(), 2);
        assert_eq!(count_by_status(&db, ListingStatus::Active).await.unwrap(), 2);
        assert_eq!(count_boosted(&db).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn search_matches_external_id_and_caption() {
        let (db, _dir) = setup_db().await;

        insert_listing(&db, &make_listing("41", -100)).await.unwrap();
        let mut other = make_listing("52", -100);
        other.caption = Some("riverside view".to_string());
        insert_listing(&db, &other).await.unwrap();

        let by_id = search(&db, "41").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].external_id, "41");

        let by_caption = search(&db, "riverside").await.unwrap();
        assert_eq!(by_caption.len(), 1);
        assert_eq!(by_caption[0].external_id, "52");

        assert!(search(&db, "nothing-matches").await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_listing_removes_row() {
        let (db, _dir) = setup_db().await;

        let id = insert_listing(&db, &make_listing("7", -100)).await.unwrap();
        delete_listing(&db, id).await.unwrap();
        assert!(get_listing(&db, id).await.unwrap().is_none());
        assert_eq!(count_all(&db).await.unwrap(), 0);

        db.close().await.unwrap();
    }
}
