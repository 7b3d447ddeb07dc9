// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /{instance_id}/chat/send/text, GET /{instance_id}/chat/messages,
//! GET /{instance_id}/status, and the public GET /health.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use wagate_core::{HealthStatus, InstanceId, MessageView};
use wagate_dispatch::SendTextRequest;
use wagate_registry::InstanceStatus;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /{instance_id}/chat/send/text.
#[derive(Debug, Deserialize)]
pub struct SendTextBody {
    #[serde(rename = "Phone", default)]
    pub phone: String,
    #[serde(rename = "Text", default)]
    pub text: String,
}

/// Response body for a dispatched message.
#[derive(Debug, Serialize)]
pub struct SendTextResponse {
    #[serde(rename = "Message")]
    pub message: MessageView,
}

/// Query string for GET /{instance_id}/chat/messages.
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub phone: String,
}

/// Response body for GET /{instance_id}/chat/messages.
#[derive(Debug, Serialize)]
pub struct ChatMessagesResponse {
    #[serde(rename = "Messages")]
    pub messages: Vec<MessageView>,
}

/// Response body for GET /{instance_id}/status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(rename = "Status")]
    pub status: InstanceStatus,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
    /// Registered instances with a live session.
    pub authenticated_instances: usize,
    /// Registered instances waiting for a session.
    pub pending_instances: usize,
}

/// POST /{instance_id}/chat/send/text
///
/// Sends one text message through the dispatch pipeline and returns the
/// stored record.
pub async fn send_text(
    State(state): State<GatewayState>,
    Path(instance_id): Path<String>,
    body: Result<Json<SendTextBody>, JsonRejection>,
) -> Result<Json<SendTextResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(%instance_id, error = %rejection, "unparsable send body");
        ApiError::bad_request("Body data is invalid")
    })?;

    let request = SendTextRequest {
        instance_id: InstanceId::from(instance_id),
        phone: body.phone,
        text: body.text,
    };
    let cancel = state.cancel.child_token();
    let message = state.pipeline.send_text(request, &cancel).await?;
    Ok(Json(SendTextResponse { message }))
}

/// GET /{instance_id}/chat/messages?phone=...
///
/// Returns the stored records of one chat, oldest first.
pub async fn chat_messages(
    State(state): State<GatewayState>,
    Path(instance_id): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatMessagesResponse>, ApiError> {
    let instance_id = InstanceId::from(instance_id);
    if state.registry.status(&instance_id).is_none() {
        return Err(ApiError::instance_not_found(instance_id.as_str()));
    }
    let chat = wagate_core::resolve(&query.phone)
        .ok_or_else(|| ApiError::bad_request("Invalid phone"))?;

    let records = state
        .store
        .get_chat_messages(&instance_id, chat.user())
        .await?;
    let messages = records
        .iter()
        .map(|record| state.store.to_external_view(record))
        .collect();
    Ok(Json(ChatMessagesResponse { messages }))
}

/// GET /{instance_id}/status
pub async fn instance_status(
    State(state): State<GatewayState>,
    Path(instance_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .registry
        .status(&InstanceId::from(instance_id.as_str()))
        .map(|status| Json(StatusResponse { status }))
        .ok_or_else(|| ApiError::instance_not_found(&instance_id))
}

/// GET /health (unauthenticated)
///
/// Reports storage health, uptime, and instance counts.
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => "ok",
        Ok(other) => {
            tracing::warn!(health = ?other, "storage reported degraded health");
            "degraded"
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "degraded"
        }
    };

    let (authenticated, pending) = state.registry.list().into_iter().fold(
        (0, 0),
        |(auth, pending), (_, status)| match status {
            InstanceStatus::Authenticated => (auth + 1, pending),
            InstanceStatus::Pending => (auth, pending + 1),
        },
    );

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        authenticated_instances: authenticated,
        pending_instances: pending,
    })
}
