// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for adrelay integration tests.
//!
//! Provides a capturing [`MockTransport`] and fragment/listing fixtures used
//! by the engine and workspace end-to-end tests.

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::{ForwardRecord, MediaGroupRecord, MockTransport};
