// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud API wire types.

use serde::{Deserialize, Serialize};
use wagate_core::{Jid, MessageContent};

/// Body of `POST /{phone_number_id}/messages`.
#[derive(Debug, Serialize)]
pub struct OutboundRequest<'a> {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: &'a str,
    #[serde(flatten)]
    pub payload: OutboundPayload<'a>,
}

/// Typed message payload, tagged by `type`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundPayload<'a> {
    Text { text: TextBody<'a> },
}

#[derive(Debug, Serialize)]
pub struct TextBody<'a> {
    pub preview_url: bool,
    pub body: &'a str,
}

impl<'a> OutboundRequest<'a> {
    /// Build the wire request for `content` addressed to `to`.
    pub fn new(to: &'a Jid, content: &'a MessageContent) -> Self {
        let payload = match content {
            MessageContent::ExtendedText { text } => OutboundPayload::Text {
                text: TextBody {
                    preview_url: true,
                    body: text,
                },
            },
        };
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: to.user(),
            payload,
        }
    }
}

/// Successful send response.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}
