// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance session trait: one authenticated connection for one account.

use async_trait::async_trait;

use crate::error::WagateError;
use crate::jid::Jid;
use crate::types::{InstanceId, MessageContent, SendReceipt};

/// A live, authenticated connection to the messaging network.
///
/// A session belongs to exactly one instance for its whole lifetime and may
/// serve many concurrent sends. Completion order of concurrent sends is not
/// guaranteed.
#[async_trait]
pub trait InstanceSession: Send + Sync + 'static {
    /// The instance this session belongs to.
    fn instance_id(&self) -> &InstanceId;

    /// The account's own address on the network.
    fn own_address(&self) -> &Jid;

    /// Transmits one message and waits for the network acknowledgment.
    ///
    /// Every call produces one transmission; there is no deduplication.
    /// Dropping the returned future abandons the wait for the acknowledgment.
    async fn send_message(
        &self,
        to: &Jid,
        content: &MessageContent,
    ) -> Result<SendReceipt, WagateError>;
}
