// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the adrelay relay.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the adrelay workspace. The storage and
//! transport adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelayError;
pub use types::{
    AdapterType, BoostStatus, ForwardedRefs, Fragment, HealthStatus, Listing, ListingStatus,
    MediaItem, MediaKind, RelayStats, SourceRef,
};

// Re-export all adapter traits at crate root.
pub use traits::{ListingStore, PluginAdapter, Transport};
