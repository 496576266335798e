// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the messaging platform boundary.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MediaItem, SourceRef};

/// Adapter for the outbound messaging boundary.
///
/// All operations are fallible per destination; callers decide whether a
/// failure aborts or continues with siblings.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Forwards the original source message by reference (no re-upload) to
    /// the destination chat. Returns the destination-side message id.
    async fn forward_message(&self, to_chat: i64, source: &SourceRef) -> Result<i32, RelayError>;

    /// Sends an ordered set of media items as one grouped multi-media unit.
    /// The caption, if any, is attached to the first item only. Returns the
    /// destination-side message ids in delivery order.
    async fn send_media_group(
        &self,
        to_chat: i64,
        media: &[MediaItem],
        caption: Option<&str>,
    ) -> Result<Vec<i32>, RelayError>;

    /// Retracts a previously delivered message.
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), RelayError>;

    /// Sends a plain text notice, used for operator notifications and
    /// command acknowledgements.
    async fn send_notice(&self, chat_id: i64, text: &str) -> Result<i32, RelayError>;
}
