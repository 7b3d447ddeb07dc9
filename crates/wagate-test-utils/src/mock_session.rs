// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock instance session for deterministic testing.
//!
//! `MockSession` implements `InstanceSession` with a scripted outcome and
//! captures every transmission for assertion in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use wagate_core::{InstanceId, InstanceSession, Jid, MessageContent, SendReceipt, WagateError};

enum Outcome {
    Ack(SendReceipt),
    Reject(String),
}

/// A mock session that acknowledges (or rejects) every send the same way.
pub struct MockSession {
    instance_id: InstanceId,
    own_address: Jid,
    outcome: Outcome,
    delay: Option<Duration>,
    sends: AtomicUsize,
    sent: Mutex<Vec<(Jid, MessageContent)>>,
}

impl MockSession {
    /// A session that acknowledges every send with `receipt`.
    pub fn acknowledging(instance_id: &str, own_phone: &str, receipt: SendReceipt) -> Self {
        Self::with_outcome(instance_id, own_phone, Outcome::Ack(receipt))
    }

    /// A session whose every send is rejected by the network with `reason`.
    pub fn rejecting(instance_id: &str, own_phone: &str, reason: &str) -> Self {
        Self::with_outcome(instance_id, own_phone, Outcome::Reject(reason.to_string()))
    }

    fn with_outcome(instance_id: &str, own_phone: &str, outcome: Outcome) -> Self {
        let own_address = wagate_core::resolve(own_phone)
            .unwrap_or_else(|| panic!("mock session phone `{own_phone}` must resolve"));
        Self {
            instance_id: InstanceId::from(instance_id),
            own_address,
            outcome,
            delay: None,
            sends: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Wait `delay` before answering each send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of transmissions attempted so far.
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Every `(recipient, content)` pair handed to `send_message`.
    pub async fn sent_messages(&self) -> Vec<(Jid, MessageContent)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl InstanceSession for MockSession {
    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn own_address(&self) -> &Jid {
        &self.own_address
    }

    async fn send_message(
        &self,
        to: &Jid,
        content: &MessageContent,
    ) -> Result<SendReceipt, WagateError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push((to.clone(), content.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            Outcome::Ack(receipt) => Ok(receipt.clone()),
            Outcome::Reject(reason) => Err(WagateError::send(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> SendReceipt {
        SendReceipt {
            message_id: "MSG1".into(),
            timestamp: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn acknowledging_session_returns_receipt_and_counts() {
        let session = MockSession::acknowledging("abc", "5511999990000", receipt());
        let to = wagate_core::resolve("5511888880000").unwrap();

        let got = session
            .send_message(&to, &MessageContent::text("hi"))
            .await
            .unwrap();
        assert_eq!(got, receipt());
        assert_eq!(session.send_count(), 1);

        let sent = session.sent_messages().await;
        assert_eq!(sent[0].0, to);
        assert_eq!(sent[0].1.body(), "hi");
    }

    #[tokio::test]
    async fn rejecting_session_still_counts_the_attempt() {
        let session = MockSession::rejecting("abc", "5511999990000", "blocked");
        let to = wagate_core::resolve("5511888880000").unwrap();

        let err = session
            .send_message(&to, &MessageContent::text("hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("blocked"));
        assert_eq!(session.send_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let session = MockSession::acknowledging("abc", "5511999990000", receipt())
            .with_delay(Duration::from_secs(5));
        let to = wagate_core::resolve("5511888880000").unwrap();

        let started = tokio::time::Instant::now();
        session
            .send_message(&to, &MessageContent::text("hi"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
