// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The listing lifecycle state machine.
//!
//! Allowed transitions:
//! - `Active -> Sent` (scheduler dispatch)
//! - `Sent -> Active` (queue recycling, bulk)
//! - `Active | Sent -> Deleted` (operator delete, after reversing dispatch
//!   effects)
//!
//! `Error` is reserved: nothing transitions into it automatically, and a
//! listing in `Error` stays there until operator intervention at the store
//! level. Boost toggles are legal in any status and are not part of this
//! state machine.

use adrelay_core::types::ListingStatus;
use adrelay_core::RelayError;

/// Whether `from -> to` is a legal lifecycle transition.
pub fn can_transition(from: ListingStatus, to: ListingStatus) -> bool {
    use ListingStatus::*;
    matches!(
        (from, to),
        (Active, Sent) | (Sent, Active) | (Active, Deleted) | (Sent, Deleted)
    )
}

/// Validate a transition, returning [`RelayError::InvalidTransition`] when
/// it is not legal.
pub fn check_transition(from: ListingStatus, to: ListingStatus) -> Result<(), RelayError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(RelayError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
