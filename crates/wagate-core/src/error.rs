// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Wagate messaging gateway.

use thiserror::Error;

/// The primary error type used across all Wagate adapter traits and core operations.
#[derive(Debug, Error)]
pub enum WagateError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No instance with this identifier is known to the registry.
    #[error("instance not found: {instance_id}")]
    InstanceNotFound { instance_id: String },

    /// The instance is known but has no live authenticated session.
    #[error("instance not authenticated: {instance_id}")]
    InstanceNotAuthenticated { instance_id: String },

    /// Transport failure or network-side rejection while sending a message.
    #[error("send error: {message}")]
    Send {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Operation was cancelled by the caller before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WagateError {
    /// Shorthand for a send error without an underlying source.
    pub fn send(message: impl Into<String>) -> Self {
        WagateError::Send {
            message: message.into(),
            source: None,
        }
    }
}
