// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch failure taxonomy.

use strum::Display;
use thiserror::Error;
use wagate_core::{InstanceId, SendReceipt, WagateError};

/// Steps of one dispatch, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DispatchStage {
    Validating,
    ResolvingRecipient,
    FetchingSession,
    Sending,
    Persisting,
    Succeeded,
}

/// Terminal failure of one dispatch.
///
/// The variants separate the outcomes a caller must handle differently:
/// fix the input, fix the instance, retry later, or reconcile a message
/// that reached the network without a local record.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed caller input. Nothing was sent or stored.
    #[error("{reason}")]
    BadRequest {
        stage: DispatchStage,
        reason: String,
    },

    /// No instance with this id is registered.
    #[error("instance not found: {instance_id}")]
    InstanceNotFound { instance_id: InstanceId },

    /// The instance exists but has no live session.
    #[error("instance not authenticated: {instance_id}")]
    InstanceNotAuthenticated { instance_id: InstanceId },

    /// The network send failed, timed out, or was cancelled. Nothing was stored.
    #[error("send failed: {cause}")]
    SendFailed {
        #[source]
        cause: WagateError,
    },

    /// The network accepted the message but the record could not be stored.
    #[error("message {} was sent but could not be recorded: {cause}", .receipt.message_id)]
    PersistenceFailed {
        receipt: SendReceipt,
        #[source]
        cause: WagateError,
    },
}

impl DispatchError {
    pub(crate) fn bad_request(stage: DispatchStage, reason: impl Into<String>) -> Self {
        DispatchError::BadRequest {
            stage,
            reason: reason.into(),
        }
    }

    /// The stage the dispatch failed in.
    pub fn stage(&self) -> DispatchStage {
        match self {
            DispatchError::BadRequest { stage, .. } => *stage,
            DispatchError::InstanceNotFound { .. }
            | DispatchError::InstanceNotAuthenticated { .. } => DispatchStage::FetchingSession,
            DispatchError::SendFailed { .. } => DispatchStage::Sending,
            DispatchError::PersistenceFailed { .. } => DispatchStage::Persisting,
        }
    }

    /// Stable machine-readable code for external error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::BadRequest { .. } => "bad_request",
            DispatchError::InstanceNotFound { .. } => "instance_not_found",
            DispatchError::InstanceNotAuthenticated { .. } => "instance_not_authenticated",
            DispatchError::SendFailed { .. } => "send_failed",
            DispatchError::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

impl From<wagate_registry::LookupError> for DispatchError {
    fn from(err: wagate_registry::LookupError) -> Self {
        match err {
            wagate_registry::LookupError::NotFound(instance_id) => {
                DispatchError::InstanceNotFound { instance_id }
            }
            wagate_registry::LookupError::NotAuthenticated(instance_id) => {
                DispatchError::InstanceNotAuthenticated { instance_id }
            }
        }
    }
}
