// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use wagate_config::model::StorageConfig;
use wagate_core::{
    AdapterType, HealthStatus, InstanceId, MessageRecord, MessageStore, PluginAdapter,
    WagateError,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed message record store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`MessageStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`MessageStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, WagateError> {
        self.db.get().ok_or_else(|| WagateError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, WagateError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WagateError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), WagateError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| WagateError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn create_message(&self, record: &MessageRecord) -> Result<(), WagateError> {
        queries::messages::insert_message(self.db()?, record).await?;
        debug!(
            instance_id = %record.instance_id,
            message_id = %record.message_id,
            "message record stored"
        );
        Ok(())
    }

    async fn get_chat_messages(
        &self,
        instance_id: &InstanceId,
        chat_jid: &str,
    ) -> Result<Vec<MessageRecord>, WagateError> {
        queries::messages::get_chat_messages(self.db()?, instance_id, chat_jid).await
    }
}
