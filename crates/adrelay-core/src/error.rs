// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the adrelay relay.

use thiserror::Error;

/// The primary error type used across all adrelay adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors (forward/send/delete failures against the messaging platform).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operator-supplied listing id that does not parse as a listing number.
    #[error("invalid listing id: {0}")]
    InvalidListingId(String),

    /// A listing id that parses but matches no stored listing.
    #[error("listing not found: {0}")]
    ListingNotFound(String),

    /// A status transition not permitted by the listing lifecycle.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
