// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The forwarding scheduler: a long-running control loop that paces
//! outbound delivery, interleaves boosted re-sends, recycles the active
//! queue when it empties, and reacts to live operator commands without
//! restart.
//!
//! Candidates are re-read from the store every cycle (there is no
//! persistent queue), so status changes made elsewhere take effect on the
//! next cycle. Dispatch order within a cycle is ascending numeric external
//! id, independent of arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use adrelay_core::types::{Listing, ListingStatus};
use adrelay_core::{ListingStore, RelayError};

use crate::control::ControlState;
use crate::dispatch::Dispatcher;
use crate::throttle::Throttle;

/// Short wait acknowledging an operator refresh request before the next
/// cycle re-reads the store.
const REFRESH_ACK_DELAY: Duration = Duration::from_secs(1);

/// The scheduler loop and its control surface.
pub struct ForwardingScheduler {
    store: Arc<dyn ListingStore>,
    dispatcher: Arc<Dispatcher>,
    control: Arc<ControlState>,
    sources: Vec<i64>,
    boost_every: u64,
    pacing: Throttle,
    /// Monotonic dispatch counter, carried across cycles.
    counter: AtomicU64,
}

impl ForwardingScheduler {
    pub fn new(
        store: Arc<dyn ListingStore>,
        dispatcher: Arc<Dispatcher>,
        control: Arc<ControlState>,
        sources: Vec<i64>,
        boost_every: u64,
        pacing: Throttle,
    ) -> Self {
        Self {
            store,
            dispatcher,
            control,
            sources,
            boost_every,
            pacing,
            counter: AtomicU64::new(0),
        }
    }

    /// Total listings dispatched since startup.
    pub fn dispatch_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Run the scheduler until the cancellation token fires.
    ///
    /// There is no other terminal state; pausing via the control state
    /// keeps listings `Active` until they are actually dispatched.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            sources = self.sources.len(),
            interval_secs = self.pacing.interval().as_secs(),
            boost_every = self.boost_every,
            "forwarding scheduler running"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            // The store is re-read every cycle anyway; the refresh flag
            // only exists to acknowledge the operator command.
            if self.control.take_refresh() {
                info!("refresh acknowledged, re-reading listings next cycle");
                if Throttle::new(REFRESH_ACK_DELAY).pause_or_cancel(&cancel).await {
                    break;
                }
                continue;
            }

            if !self.control.sending_enabled() {
                if self.pacing.pause_or_cancel(&cancel).await {
                    break;
                }
                continue;
            }

            if let Err(e) = self.run_once(&cancel).await {
                error!(error = %e, "scheduler cycle failed");
            }

            if self.pacing.pause_or_cancel(&cancel).await {
                break;
            }
        }

        info!("forwarding scheduler stopped");
    }

    /// Execute one dispatch cycle: deliver the active batch in numeric id
    /// order, interleave boosted re-sends at the configured cadence, then
    /// recycle sent listings if the active set is empty.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<(), RelayError> {
        let batch = self.active_batch().await?;
        debug!(candidates = batch.len(), "dispatch cycle starting");

        for listing in &batch {
            // Re-checked before every dispatch so a mid-batch pause halts
            // without losing progress.
            if cancel.is_cancelled() || !self.control.sending_enabled() {
                debug!("sending disabled mid-batch, remaining listings stay active");
                break;
            }

            self.dispatcher.dispatch(listing).await?;
            // A completed dispatch attempt always advances the listing,
            // regardless of per-destination outcomes.
            self.store
                .update_status(listing.id, ListingStatus::Sent)
                .await?;
            counter!("adrelay_dispatched_listings_total").increment(1);

            let dispatched = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            if dispatched % self.boost_every == 0 {
                self.resend_boosted().await?;
            }

            if self.pacing.pause_or_cancel(cancel).await {
                break;
            }
        }

        if self.store.count_by_status(ListingStatus::Active).await? == 0 {
            let recycled = self.store.recycle_sent().await?;
            if recycled > 0 {
                counter!("adrelay_recycled_listings_total").increment(recycled);
                info!(recycled, "active set empty, recycled sent listings");
            }
        }

        Ok(())
    }

    /// All active listings across the configured sources, ordered by
    /// ascending numeric external id (non-numeric ids last, stably).
    async fn active_batch(&self) -> Result<Vec<Listing>, RelayError> {
        let mut batch = Vec::new();
        for &source in &self.sources {
            batch.extend(
                self.store
                    .list_by_source_and_status(source, ListingStatus::Active)
                    .await?,
            );
        }
        batch.sort_by_key(|listing| numeric_id(&listing.external_id));
        Ok(batch)
    }

    /// Re-send every currently boosted listing, leaving status and boost
    /// flags untouched.
    async fn resend_boosted(&self) -> Result<(), RelayError> {
        let boosted = self.store.list_boosted().await?;
        if boosted.is_empty() {
            return Ok(());
        }
        debug!(count = boosted.len(), "boost cadence reached, re-sending boosted listings");
        for listing in &boosted {
            self.dispatcher.dispatch(listing).await?;
            counter!("adrelay_boost_resends_total").increment(1);
        }
        Ok(())
    }
}

/// Numeric ordering key for external ids; unparseable ids sort last.
fn numeric_id(external_id: &str) -> i64 {
    external_id.parse::<i64>().unwrap_or(i64::MAX)
}
