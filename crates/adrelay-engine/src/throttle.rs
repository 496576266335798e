// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval pacing, decoupled from the dispatch logic it protects.
//!
//! Both the between-listing scheduler wait and the per-destination send
//! delay are instances of the same throttle, so the pacing policy can be
//! tuned (or swapped for a token bucket) without touching the state machine.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A fixed-interval pacer.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one full interval.
    pub async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }

    /// Wait one full interval, returning early if the token is cancelled.
    /// Returns `true` when cancelled.
    pub async fn pause_or_cancel(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => false,
            _ = cancel.cancelled() => true,
        }
    }
}
