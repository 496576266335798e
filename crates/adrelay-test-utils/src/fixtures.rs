// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fragment and listing builders shared by engine and e2e tests.

use adrelay_core::types::{Fragment, Listing, MediaItem, MediaKind, SourceRef};

/// A photo fragment with a caption, optionally part of a media group.
pub fn photo_fragment(
    chat_id: i64,
    message_id: i32,
    media_group_id: Option<&str>,
    caption: Option<&str>,
) -> Fragment {
    Fragment {
        chat_id,
        message_id,
        media_group_id: media_group_id.map(|s| s.to_string()),
        text: None,
        caption: caption.map(|s| s.to_string()),
        media: Some(MediaItem {
            kind: MediaKind::Photo,
            file_id: format!("photo-{message_id}"),
        }),
    }
}

/// A video fragment, optionally part of a media group.
pub fn video_fragment(
    chat_id: i64,
    message_id: i32,
    media_group_id: Option<&str>,
    caption: Option<&str>,
) -> Fragment {
    Fragment {
        chat_id,
        message_id,
        media_group_id: media_group_id.map(|s| s.to_string()),
        text: None,
        caption: caption.map(|s| s.to_string()),
        media: Some(MediaItem {
            kind: MediaKind::Video,
            file_id: format!("video-{message_id}"),
        }),
    }
}

/// A plain text fragment with no attachment.
pub fn text_fragment(
    chat_id: i64,
    message_id: i32,
    media_group_id: Option<&str>,
    text: &str,
) -> Fragment {
    Fragment {
        chat_id,
        message_id,
        media_group_id: media_group_id.map(|s| s.to_string()),
        text: Some(text.to_string()),
        caption: None,
        media: None,
    }
}

/// A single-photo listing ready for insertion.
pub fn photo_listing(external_id: &str, chat_id: i64, message_id: i32) -> Listing {
    Listing::new(
        external_id.to_string(),
        SourceRef {
            chat_id,
            message_id,
        },
        None,
        vec![MediaItem {
            kind: MediaKind::Photo,
            file_id: format!("photo-{message_id}"),
        }],
        Some(format!("ID {external_id}")),
        "2026-01-01T00:00:00.000Z".to_string(),
    )
}
