// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The adrelay core engine.
//!
//! - [`aggregator`]: reconstructs one logical listing out of an unordered
//!   burst of inbound fragments sharing a media-group key.
//! - [`lifecycle`]: the listing status state machine.
//! - [`scheduler`]: the long-running forwarding loop with pacing, boost
//!   cadence, recycling, and live operator control.
//! - [`dispatch`]: per-destination delivery and reversal.
//! - [`ops`]: the operator-action surface exposed to front ends.
//! - [`control`] / [`throttle`] / [`shutdown`]: shared control state,
//!   fixed-interval pacing, and signal-driven cancellation.

pub mod aggregator;
pub mod control;
pub mod dispatch;
pub mod lifecycle;
pub mod ops;
pub mod scheduler;
pub mod shutdown;
pub mod throttle;

pub use aggregator::{extract_external_id, Aggregator};
pub use control::ControlState;
pub use dispatch::Dispatcher;
pub use ops::{parse_listing_id, Operations};
pub use scheduler::ForwardingScheduler;
pub use throttle::Throttle;
