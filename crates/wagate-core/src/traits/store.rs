// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message record store trait.

use async_trait::async_trait;

use crate::error::WagateError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InstanceId, MessageRecord, MessageView};

/// Durable store of sent-message records.
///
/// Records are written once and never updated. Each `create_message` call is
/// atomic on its own; no cross-record transaction is offered.
#[async_trait]
pub trait MessageStore: PluginAdapter {
    /// Initializes the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), WagateError>;

    /// Persists `record` verbatim.
    async fn create_message(&self, record: &MessageRecord) -> Result<(), WagateError>;

    /// Records of one chat for one instance, oldest first.
    async fn get_chat_messages(
        &self,
        instance_id: &InstanceId,
        chat_jid: &str,
    ) -> Result<Vec<MessageRecord>, WagateError>;

    /// Maps a record to its external representation without touching storage.
    fn to_external_view(&self, record: &MessageRecord) -> MessageView {
        MessageView::from(record)
    }
}
