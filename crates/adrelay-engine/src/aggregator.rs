// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media-group aggregation: reconstructs one logical listing out of an
//! unordered burst of inbound fragments sharing a correlation key.
//!
//! Grouped fragments are buffered per key; the first arrival for a key
//! schedules a finalize task after a fixed grace delay, which drains the
//! buffer and persists at most one listing. The buffer entry never outlives
//! its finalize task, so the map stays bounded.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use adrelay_core::types::{Fragment, Listing, SourceRef};
use adrelay_core::{ListingStore, RelayError};

/// Case-insensitive listing-id pattern: "ID", optional separators, digits.
/// Leading zeros are consumed outside the capture group.
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bID[\s:_-]*0*(\d+)\b").expect("listing id pattern compiles")
});

/// Extract the external listing id from free text, leading zeros stripped.
pub fn extract_external_id(text: &str) -> Option<String> {
    ID_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Reconstructs listings from inbound fragments.
///
/// Cloning is cheap: clones share the buffer map and store handle, which is
/// what the spawned finalize tasks rely on.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn ListingStore>,
    buffers: Arc<Mutex<HashMap<String, Vec<Fragment>>>>,
    grace: Duration,
}

impl Aggregator {
    pub fn new(store: Arc<dyn ListingStore>, grace: Duration) -> Self {
        Self {
            store,
            buffers: Arc::new(Mutex::new(HashMap::new())),
            grace,
        }
    }

    /// Feed one inbound fragment.
    ///
    /// Fragments without a group key are complete submissions and persist
    /// immediately; grouped fragments are buffered until the grace delay
    /// elapses. Malformed submissions are discarded with a log, never an
    /// error.
    pub async fn ingest(&self, fragment: Fragment) -> Result<(), RelayError> {
        match fragment.media_group_id.clone() {
            None => {
                self.ingest_single(fragment).await?;
                Ok(())
            }
            Some(key) => {
                let first_arrival = {
                    let mut buffers = self.buffers.lock().await;
                    let first = !buffers.contains_key(&key);
                    buffers.entry(key.clone()).or_default().push(fragment);
                    first
                };

                if first_arrival {
                    // The finalize task owns cleanup of its key; the buffer
                    // entry cannot outlive it.
                    let aggregator = self.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(aggregator.grace).await;
                        if let Err(e) = aggregator.finalize_group(&key).await {
                            error!(group_id = %key, error = %e, "media group finalize failed");
                        }
                    });
                }
                Ok(())
            }
        }
    }

    /// Persist a complete single-fragment submission.
    ///
    /// Returns the new listing's storage id, or `None` when the fragment was
    /// discarded (no recognizable id, or no supported attachment).
    async fn ingest_single(&self, fragment: Fragment) -> Result<Option<i64>, RelayError> {
        let text = fragment
            .text
            .as_deref()
            .or(fragment.caption.as_deref())
            .unwrap_or("");

        let Some(external_id) = extract_external_id(text) else {
            warn!(
                chat_id = fragment.chat_id,
                message_id = fragment.message_id,
                "no listing id found in message, discarding"
            );
            return Ok(None);
        };

        let Some(media) = fragment.media.clone() else {
            debug!(
                chat_id = fragment.chat_id,
                message_id = fragment.message_id,
                "message carries no supported attachment, discarding"
            );
            return Ok(None);
        };

        let listing = Listing::new(
            external_id.clone(),
            SourceRef {
                chat_id: fragment.chat_id,
                message_id: fragment.message_id,
            },
            None,
            vec![media],
            fragment.caption.clone(),
            chrono::Utc::now().to_rfc3339(),
        );

        let id = self.store.insert(&listing).await?;
        info!(external_id = %external_id, listing_id = id, "new listing stored");
        Ok(Some(id))
    }

    /// Drain and persist one buffered media group.
    ///
    /// Idempotent: a second finalize for an already-drained key is a no-op.
    /// Returns the new listing's storage id, or `None` when nothing was
    /// persisted.
    pub async fn finalize_group(&self, key: &str) -> Result<Option<i64>, RelayError> {
        let Some(fragments) = self.buffers.lock().await.remove(key) else {
            return Ok(None);
        };
        if fragments.is_empty() {
            return Ok(None);
        }

        let combined: String = fragments
            .iter()
            .map(Fragment::caption_or_text)
            .collect::<Vec<_>>()
            .join(" ");

        let Some(external_id) = extract_external_id(&combined) else {
            warn!(group_id = %key, "no listing id found in media group, discarding");
            return Ok(None);
        };

        let media: Vec<_> = fragments.iter().filter_map(|f| f.media.clone()).collect();

        // The first fragment is the representative source coordinate; its
        // caption wins, falling back to the combined text.
        let first = &fragments[0];
        let caption = first
            .caption
            .clone()
            .unwrap_or_else(|| combined.clone());

        let listing = Listing::new(
            external_id.clone(),
            SourceRef {
                chat_id: first.chat_id,
                message_id: first.message_id,
            },
            Some(key.to_string()),
            media,
            Some(caption),
            chrono::Utc::now().to_rfc3339(),
        );

        let id = self.store.insert(&listing).await?;
        info!(
            external_id = %external_id,
            listing_id = id,
            fragments = fragments.len(),
            "media group listing stored"
        );
        Ok(Some(id))
    }

    /// Number of media groups currently buffered (not yet finalized).
    pub async fn pending_groups(&self) -> usize {
        self.buffers.lock().await.len()
    }
}
