// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared control state read by the scheduler loop and written by
//! operator-action handlers.
//!
//! `sending_enabled` is level-triggered: the scheduler re-reads it before
//! every dispatch. `refresh_requested` is edge-triggered: the scheduler
//! takes-and-clears it once per observation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic holder for the scheduler's two control signals.
#[derive(Debug)]
pub struct ControlState {
    sending: AtomicBool,
    refresh: AtomicBool,
}

impl ControlState {
    /// New control state with sending enabled and no pending refresh.
    pub fn new() -> Self {
        Self {
            sending: AtomicBool::new(true),
            refresh: AtomicBool::new(false),
        }
    }

    /// Whether outbound dispatch is currently enabled.
    pub fn sending_enabled(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// Enable or disable outbound dispatch.
    pub fn set_sending(&self, enabled: bool) {
        self.sending.store(enabled, Ordering::SeqCst);
    }

    /// Request a refresh acknowledgement from the scheduler.
    pub fn request_refresh(&self) {
        self.refresh.store(true, Ordering::SeqCst);
    }

    /// Take-and-clear the refresh request. Returns whether one was pending.
    pub fn take_refresh(&self) -> bool {
        self.refresh.swap(false, Ordering::SeqCst)
    }

    /// Peek at the refresh request without clearing it.
    pub fn refresh_requested(&self) -> bool {
        self.refresh.load(Ordering::SeqCst)
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
