// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Wagate integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without a network
//! connection or a database file.
//!
//! # Components
//!
//! - [`MockSession`] - Instance session with a scripted acknowledgment and a send counter
//! - [`MockStore`] - In-memory message store with an injectable write failure

pub mod mock_session;
pub mod mock_store;

pub use mock_session::MockSession;
pub use mock_store::MockStore;
