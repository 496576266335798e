// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch executor: delivers one listing to every destination chat, and
//! reverses recorded deliveries on demand.
//!
//! A failure at one destination never aborts sends to the others; it is
//! logged and pushed to the operator chat. A fixed short throttle pause
//! follows every destination attempt to stay under platform rate limits.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, error, info};

use adrelay_core::types::{ForwardedRefs, Listing};
use adrelay_core::{ListingStore, RelayError, Transport};

use crate::throttle::Throttle;

/// Delay inserted after each destination send, regardless of outcome.
const DESTINATION_DELAY: Duration = Duration::from_secs(1);

/// Delivers listings to the configured destination chats.
pub struct Dispatcher {
    store: Arc<dyn ListingStore>,
    transport: Arc<dyn Transport>,
    targets: Vec<i64>,
    notify_chat: Option<i64>,
    footer: Option<String>,
    per_destination: Throttle,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ListingStore>,
        transport: Arc<dyn Transport>,
        targets: Vec<i64>,
        notify_chat: Option<i64>,
        footer_links: &[String],
    ) -> Self {
        let footer = if footer_links.is_empty() {
            None
        } else {
            Some(footer_links.join("\n"))
        };
        Self {
            store,
            transport,
            targets,
            notify_chat,
            footer,
            per_destination: Throttle::new(DESTINATION_DELAY),
        }
    }

    /// The transport this dispatcher sends through.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The caption sent with a listing: its stored caption plus the
    /// promotional footer. `None` when the listing has no caption (the
    /// footer is never sent on its own).
    fn outbound_caption(&self, listing: &Listing) -> Option<String> {
        let caption = listing.caption.as_deref().filter(|c| !c.is_empty())?;
        Some(match &self.footer {
            Some(footer) => format!("{caption}\n\n{footer}"),
            None => caption.to_string(),
        })
    }

    /// Deliver one listing to every destination, in configured order.
    ///
    /// Returns the accumulated per-destination message ids; the refs are
    /// persisted only when at least one destination accepted the send.
    /// Per-destination failures are logged and reported to the operator
    /// chat, and never abort the remaining destinations.
    pub async fn dispatch(&self, listing: &Listing) -> Result<ForwardedRefs, RelayError> {
        let mut forwarded = ForwardedRefs::new();
        let caption = self.outbound_caption(listing);

        for &target in &self.targets {
            let result = if listing.media_group_id.is_some() && !listing.media.is_empty() {
                self.transport
                    .send_media_group(target, &listing.media, caption.as_deref())
                    .await
            } else {
                self.transport
                    .forward_message(target, &listing.source)
                    .await
                    .map(|id| vec![id])
            };

            match result {
                Ok(message_ids) => {
                    counter!("adrelay_dispatch_sends_total").increment(1);
                    debug!(
                        external_id = %listing.external_id,
                        target,
                        messages = message_ids.len(),
                        "listing delivered"
                    );
                    forwarded.insert(target.to_string(), message_ids);
                }
                Err(e) => {
                    counter!("adrelay_dispatch_failures_total").increment(1);
                    error!(
                        external_id = %listing.external_id,
                        target,
                        error = %e,
                        "failed to deliver listing"
                    );
                    self.notify_operator(&format!(
                        "failed to deliver listing {} to {target}: {e}",
                        listing.external_id
                    ))
                    .await;
                }
            }

            self.per_destination.pause().await;
        }

        if !forwarded.is_empty() {
            self.store.set_forwarded(listing.id, &forwarded).await?;
        }
        Ok(forwarded)
    }

    /// Reverse recorded dispatch effects: retract every recorded
    /// destination message, then clear the stored refs.
    ///
    /// Individual retraction failures are logged and do not block the
    /// others, nor the final clearing of the record.
    pub async fn retract(&self, listing: &Listing) -> Result<(), RelayError> {
        if listing.forwarded.is_empty() {
            return Ok(());
        }

        for (chat, message_ids) in &listing.forwarded {
            let Ok(chat_id) = chat.parse::<i64>() else {
                error!(
                    external_id = %listing.external_id,
                    chat = %chat,
                    "unparseable destination chat in forwarded record, skipping retraction"
                );
                continue;
            };
            for &message_id in message_ids {
                if let Err(e) = self.transport.delete_message(chat_id, message_id).await {
                    error!(
                        external_id = %listing.external_id,
                        chat_id,
                        message_id,
                        error = %e,
                        "failed to retract delivered message"
                    );
                }
            }
        }

        self.store.clear_forwarded(listing.id).await?;
        info!(external_id = %listing.external_id, "dispatch effects reversed");
        Ok(())
    }

    async fn notify_operator(&self, text: &str) {
        let Some(chat) = self.notify_chat else {
            return;
        };
        if let Err(e) = self.transport.send_notice(chat, text).await {
            error!(error = %e, "failed to notify operator chat");
        }
    }
}
