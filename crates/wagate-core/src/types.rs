// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Wagate gateway.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::jid::Jid;

/// Opaque identifier of one tenant account ("instance").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        InstanceId(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        InstanceId(value)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Session,
    Storage,
    Gateway,
}

/// Content of an outbound message, as accepted by the network.
///
/// Mirrors the network's message union. Only the text envelope exists today;
/// new kinds are added as variants without touching the dispatch flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain body text wrapped in the "extended text" envelope.
    ExtendedText { text: String },
}

impl MessageContent {
    /// Wraps a plain body in the extended text envelope.
    pub fn text(body: impl Into<String>) -> Self {
        MessageContent::ExtendedText { text: body.into() }
    }

    /// The human-readable body stored alongside the record.
    pub fn body(&self) -> &str {
        match self {
            MessageContent::ExtendedText { text } => text,
        }
    }
}

/// Acknowledgment returned by the network for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Network-assigned message identifier.
    pub message_id: String,
    /// Network timestamp in seconds since the Unix epoch.
    pub timestamp: i64,
}

/// The persisted, immutable outcome of one successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// User part of the recipient address.
    pub chat_jid: String,
    /// User part of the sending account's own address.
    pub sender_jid: String,
    /// Instance that owns the record.
    pub instance_id: InstanceId,
    /// Message body text.
    pub body: String,
    /// Network timestamp (seconds since epoch), copied from the receipt.
    pub timestamp: i64,
    /// True for messages sent by the instance.
    pub from_me: bool,
    /// Network-assigned message id, copied from the receipt.
    pub message_id: String,
}

impl MessageRecord {
    /// Builds the record of an outbound message from its network receipt.
    ///
    /// Id and timestamp are taken verbatim from `receipt`.
    pub fn outbound(
        instance_id: InstanceId,
        sender: &Jid,
        chat: &Jid,
        body: impl Into<String>,
        receipt: &SendReceipt,
    ) -> Self {
        Self {
            chat_jid: chat.user().to_string(),
            sender_jid: sender.user().to_string(),
            instance_id,
            body: body.into(),
            timestamp: receipt.timestamp,
            from_me: true,
            message_id: receipt.message_id.clone(),
        }
    }
}

/// External JSON representation of a [`MessageRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    #[serde(rename = "Chat")]
    pub chat: String,
    #[serde(rename = "Sender")]
    pub sender: String,
    #[serde(rename = "InstanceID")]
    pub instance_id: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "FromMe")]
    pub from_me: bool,
    #[serde(rename = "MessageID")]
    pub message_id: String,
}

impl From<&MessageRecord> for MessageView {
    fn from(record: &MessageRecord) -> Self {
        Self {
            chat: record.chat_jid.clone(),
            sender: record.sender_jid.clone(),
            instance_id: record.instance_id.0.clone(),
            body: record.body.clone(),
            timestamp: record.timestamp,
            from_me: record.from_me,
            message_id: record.message_id.clone(),
        }
    }
}
