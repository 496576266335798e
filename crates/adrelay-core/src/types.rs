// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across adapter traits and the relay core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of a listing. Drives scheduler eligibility.
///
/// `Error` is reserved: no code path applies it automatically (dispatch
/// failures are logged and surfaced to the operator chat instead).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sent,
    Deleted,
    Error,
}

/// Promotional boost flag, orthogonal to [`ListingStatus`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BoostStatus {
    Boosted,
    Unboosted,
}

/// Closed set of supported media attachment kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

/// One media attachment: a kind tag plus the platform's opaque file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub file_id: String,
}

/// Origin coordinates of a listing: source chat and representative message.
/// Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Delivered message ids per destination chat, keyed by the chat id's
/// string form (matching the JSON storage column).
pub type ForwardedRefs = BTreeMap<String, Vec<i32>>;

/// One logical classified-ad listing, possibly reconstructed from a
/// multi-fragment media group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Storage row id; 0 until inserted.
    pub id: i64,
    /// Human-assigned identifier extracted from the post text, leading
    /// zeros stripped. Unique within the active working set only.
    pub external_id: String,
    pub source: SourceRef,
    pub status: ListingStatus,
    pub boost: BoostStatus,
    /// Correlation key of the originating media group; `None` for
    /// single-fragment listings.
    pub media_group_id: Option<String>,
    /// Attachments in original submission order.
    pub media: Vec<MediaItem>,
    /// Caption text; the promotional footer is appended at send time,
    /// never stored here.
    pub caption: Option<String>,
    /// Populated after a (partially) successful dispatch, cleared when
    /// dispatch effects are reversed.
    pub forwarded: ForwardedRefs,
    /// RFC3339 creation timestamp, set once.
    pub created_at: String,
}

impl Listing {
    /// A fresh listing as produced by ingestion: active, unboosted,
    /// nothing forwarded yet.
    pub fn new(
        external_id: String,
        source: SourceRef,
        media_group_id: Option<String>,
        media: Vec<MediaItem>,
        caption: Option<String>,
        created_at: String,
    ) -> Self {
        Self {
            id: 0,
            external_id,
            source,
            status: ListingStatus::Active,
            boost: BoostStatus::Unboosted,
            media_group_id,
            media,
            caption,
            forwarded: ForwardedRefs::new(),
            created_at,
        }
    }
}

/// One inbound unit from a source channel: text and/or one media attachment,
/// with an optional media-group correlation key.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub chat_id: i64,
    pub message_id: i32,
    pub media_group_id: Option<String>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub media: Option<MediaItem>,
}

impl Fragment {
    /// The caption if present, else the text, else the empty string.
    /// Matches how combined group text is assembled.
    pub fn caption_or_text(&self) -> &str {
        self.caption
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or("")
    }
}

/// Counts by status and boost flag, as reported to operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub total: i64,
    pub active: i64,
    pub sent: i64,
    pub deleted: i64,
    pub error: i64,
    pub boosted: i64,
}

/// Identifies the type of adapter in the plugin registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
