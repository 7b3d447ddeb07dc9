// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Wagate messaging gateway.
//!
//! This crate provides the foundational trait definitions, error types,
//! address resolution, and common types used throughout the Wagate workspace.

pub mod error;
pub mod jid;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WagateError;
pub use jid::{resolve, Jid};
pub use types::{
    AdapterType, HealthStatus, InstanceId, MessageContent, MessageRecord, MessageView,
    SendReceipt,
};

pub use traits::{InstanceSession, MessageStore, PluginAdapter};
