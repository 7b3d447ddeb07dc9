// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;
use wagate_core::WagateError;

use crate::migrations;

/// Convert a tokio-rusqlite error into WagateError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WagateError {
    WagateError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the gateway database.
///
/// Wraps the single `tokio_rusqlite::Connection` that every query goes
/// through; that connection is the only writer.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, WagateError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, WagateError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WagateError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| WagateError::Storage {
                source: Box::new(e),
            })?;

        let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            let _mode: String =
                conn.pragma_update_and_check(None, "journal_mode", journal_mode, |row| {
                    row.get(0)
                })?;
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<Result<(), WagateError>, rusqlite::Error> {
            Ok(migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, journal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The single serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), WagateError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), WagateError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(|e| WagateError::Storage {
            source: e.to_string().into(),
        })
    }
}
