// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wagate_core::WagateError;
use wagate_dispatch::DispatchError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Network id of a message that was sent but not recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// A failed API call: status plus body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                code,
                message_id: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", error)
    }

    pub fn instance_not_found(instance_id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "instance_not_found",
            format!("instance not found: {instance_id}"),
        )
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let code = err.code();
        match err {
            DispatchError::BadRequest { reason, .. } => Self::new(StatusCode::BAD_REQUEST, code, reason),
            DispatchError::InstanceNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, code, err.to_string())
            }
            DispatchError::InstanceNotAuthenticated { .. } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string())
            }
            DispatchError::SendFailed { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
            DispatchError::PersistenceFailed { ref receipt, .. } => {
                let message_id = receipt.message_id.clone();
                let mut api = Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string());
                api.body.message_id = Some(message_id);
                api
            }
        }
    }
}

impl From<WagateError> for ApiError {
    fn from(err: WagateError) -> Self {
        match err {
            WagateError::InstanceNotFound { instance_id } => Self::instance_not_found(&instance_id),
            WagateError::InstanceNotAuthenticated { .. } => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "instance_not_authenticated",
                err.to_string(),
            ),
            WagateError::Storage { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", err.to_string())
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
