// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The send-then-persist pipeline.
//!
//! Stages run strictly in order: Validating -> ResolvingRecipient ->
//! FetchingSession -> Sending -> Persisting -> Succeeded. The receipt
//! returned by the network is the only source of the record's message id
//! and timestamp.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wagate_core::{
    InstanceId, Jid, MessageContent, MessageRecord, MessageStore, MessageView, SendReceipt,
    WagateError,
};
use wagate_registry::{InstanceRegistry, SessionHandle};

use crate::error::{DispatchError, DispatchStage};

/// Longest body accepted for one text message, in characters.
pub const MAX_TEXT_CHARS: usize = 4096;

/// One "send text message" request.
#[derive(Debug, Clone)]
pub struct SendTextRequest {
    pub instance_id: InstanceId,
    pub phone: String,
    pub text: String,
}

/// Runs dispatches against a shared registry and store.
///
/// Holds no per-request state; one pipeline serves every concurrent request.
pub struct DispatchPipeline {
    registry: Arc<InstanceRegistry>,
    store: Arc<dyn MessageStore>,
    send_timeout: Duration,
}

impl DispatchPipeline {
    pub fn new(
        registry: Arc<InstanceRegistry>,
        store: Arc<dyn MessageStore>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            send_timeout,
        }
    }

    /// Send one text message and record it.
    ///
    /// `cancel` aborts the wait for the network acknowledgment; a cancelled
    /// or timed out send is reported as [`DispatchError::SendFailed`] and
    /// nothing is persisted.
    pub async fn send_text(
        &self,
        request: SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<MessageView, DispatchError> {
        let instance_id = request.instance_id.clone();
        let result = self.run(request, cancel).await;

        match &result {
            Ok(view) => info!(
                instance_id = %instance_id,
                chat = %view.chat,
                message_id = %view.message_id,
                "message dispatched"
            ),
            Err(DispatchError::PersistenceFailed { receipt, cause }) => error!(
                instance_id = %instance_id,
                message_id = %receipt.message_id,
                stage = %DispatchStage::Persisting,
                error = %cause,
                "message delivered but persistence failed"
            ),
            Err(e) => warn!(
                instance_id = %instance_id,
                stage = %e.stage(),
                error = %e,
                "dispatch failed"
            ),
        }

        result
    }

    async fn run(
        &self,
        request: SendTextRequest,
        cancel: &CancellationToken,
    ) -> Result<MessageView, DispatchError> {
        let SendTextRequest {
            instance_id,
            phone,
            text,
        } = request;

        debug!(instance_id = %instance_id, stage = %DispatchStage::Validating);
        validate(&phone, &text)?;

        debug!(instance_id = %instance_id, stage = %DispatchStage::ResolvingRecipient);
        let chat = wagate_core::resolve(&phone).ok_or_else(|| {
            DispatchError::bad_request(DispatchStage::ResolvingRecipient, "Invalid phone")
        })?;

        debug!(instance_id = %instance_id, stage = %DispatchStage::FetchingSession);
        let session = self.registry.get_authenticated_instance(&instance_id)?;

        debug!(instance_id = %instance_id, chat = %chat, stage = %DispatchStage::Sending);
        let content = MessageContent::text(text);
        let receipt = self
            .send(&session, &chat, &content, cancel)
            .await
            .map_err(|cause| DispatchError::SendFailed { cause })?;

        debug!(
            instance_id = %instance_id,
            message_id = %receipt.message_id,
            stage = %DispatchStage::Persisting
        );
        let record = MessageRecord::outbound(
            instance_id,
            session.own_address(),
            &chat,
            content.body(),
            &receipt,
        );
        if let Err(cause) = self.store.create_message(&record).await {
            return Err(DispatchError::PersistenceFailed { receipt, cause });
        }

        debug!(instance_id = %record.instance_id, stage = %DispatchStage::Succeeded);
        Ok(self.store.to_external_view(&record))
    }

    async fn send(
        &self,
        session: &SessionHandle,
        chat: &Jid,
        content: &MessageContent,
        cancel: &CancellationToken,
    ) -> Result<SendReceipt, WagateError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WagateError::Cancelled),
            outcome = tokio::time::timeout(self.send_timeout, session.send_message(chat, content)) => {
                outcome.unwrap_or(Err(WagateError::Timeout { duration: self.send_timeout }))
            }
        }
    }
}

fn validate(phone: &str, text: &str) -> Result<(), DispatchError> {
    if phone.trim().is_empty() {
        return Err(DispatchError::bad_request(
            DispatchStage::Validating,
            "Missing Phone in Payload",
        ));
    }
    if text.trim().is_empty() {
        return Err(DispatchError::bad_request(
            DispatchStage::Validating,
            "Missing Text in Payload",
        ));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(DispatchError::bad_request(
            DispatchStage::Validating,
            format!("Text exceeds {MAX_TEXT_CHARS} characters"),
        ));
    }
    Ok(())
}
