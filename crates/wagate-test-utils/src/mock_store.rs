// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message store for deterministic testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wagate_core::{
    AdapterType, HealthStatus, InstanceId, MessageRecord, MessageStore, PluginAdapter,
    WagateError,
};

/// A message store that keeps records in a vector.
///
/// `fail_writes(true)` makes every subsequent `create_message` fail without
/// storing anything, which simulates a database outage after a send.
#[derive(Default)]
pub struct MockStore {
    records: Mutex<Vec<MessageRecord>>,
    creates: AtomicUsize,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle write failures.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `create_message` calls, successful or not.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored record, in insertion order.
    pub async fn records(&self) -> Vec<MessageRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, WagateError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("writes failing".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), WagateError> {
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MockStore {
    async fn initialize(&self) -> Result<(), WagateError> {
        Ok(())
    }

    async fn create_message(&self, record: &MessageRecord) -> Result<(), WagateError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(WagateError::Storage {
                source: Box::new(std::io::Error::other("database is unavailable")),
            });
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn get_chat_messages(
        &self,
        instance_id: &InstanceId,
        chat_jid: &str,
    ) -> Result<Vec<MessageRecord>, WagateError> {
        let mut found: Vec<MessageRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| &r.instance_id == instance_id && r.chat_jid == chat_jid)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.timestamp);
        Ok(found)
    }
}
