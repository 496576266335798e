// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between Telegram messages and the relay's media model.
//!
//! Attachments stay file-id references throughout; nothing is downloaded
//! or re-uploaded.

use teloxide::types::{
    FileId, InputFile, InputMedia, InputMediaDocument, InputMediaPhoto, InputMediaVideo, Message,
    ParseMode,
};

use adrelay_core::types::{Fragment, MediaItem, MediaKind};

/// Extract the single supported attachment from a message, if any.
///
/// For photos, Telegram provides multiple sizes; the last one is the
/// largest and is the one relayed.
pub fn media_from_message(msg: &Message) -> Option<MediaItem> {
    if let Some(photos) = msg.photo() {
        let largest = photos.last()?;
        return Some(MediaItem {
            kind: MediaKind::Photo,
            file_id: largest.file.id.to_string(),
        });
    }
    if let Some(video) = msg.video() {
        return Some(MediaItem {
            kind: MediaKind::Video,
            file_id: video.file.id.to_string(),
        });
    }
    if let Some(doc) = msg.document() {
        return Some(MediaItem {
            kind: MediaKind::Document,
            file_id: doc.file.id.to_string(),
        });
    }
    None
}

/// Convert a source-chat message into an ingestion [`Fragment`].
pub fn fragment_from_message(msg: &Message) -> Fragment {
    Fragment {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        media_group_id: msg.media_group_id().map(|g| g.to_string()),
        text: msg.text().map(|s| s.to_string()),
        caption: msg.caption().map(|s| s.to_string()),
        media: media_from_message(msg),
    }
}

/// Build the `InputMedia` sequence for a grouped send.
///
/// The caption (HTML parse mode) is attached to the first item only, in
/// the original item order.
pub fn to_input_media(items: &[MediaItem], caption: Option<&str>) -> Vec<InputMedia> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let file = InputFile::file_id(FileId(item.file_id.clone()));
            let caption = if i == 0 { caption } else { None };
            match item.kind {
                MediaKind::Photo => {
                    let mut media = InputMediaPhoto::new(file);
                    if let Some(c) = caption {
                        media = media.caption(c).parse_mode(ParseMode::Html);
                    }
                    InputMedia::Photo(media)
                }
                MediaKind::Video => {
                    let mut media = InputMediaVideo::new(file);
                    if let Some(c) = caption {
                        media = media.caption(c).parse_mode(ParseMode::Html);
                    }
                    InputMedia::Video(media)
                }
                MediaKind::Document => {
                    let mut media = InputMediaDocument::new(file);
                    if let Some(c) = caption {
                        media = media.caption(c).parse_mode(ParseMode::Html);
                    }
                    InputMedia::Document(media)
                }
            }
        })
        .collect()
}
