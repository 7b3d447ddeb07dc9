// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message record operations.

use rusqlite::params;
use wagate_core::{InstanceId, MessageRecord, WagateError};

use crate::database::{map_tr_err, Database};

/// Insert a new message record. Fails on duplicate `(instance_id, message_id)`.
pub async fn insert_message(db: &Database, record: &MessageRecord) -> Result<(), WagateError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO messages (instance_id, chat_jid, sender_jid, message_id, body, timestamp, from_me)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.instance_id.as_str(),
                    record.chat_jid,
                    record.sender_jid,
                    record.message_id,
                    record.body,
                    record.timestamp,
                    record.from_me,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get the records of one chat for one instance, oldest first.
pub async fn get_chat_messages(
    db: &Database,
    instance_id: &InstanceId,
    chat_jid: &str,
) -> Result<Vec<MessageRecord>, WagateError> {
    let instance_id = instance_id.clone();
    let chat_jid = chat_jid.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<MessageRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT chat_jid, sender_jid, instance_id, body, timestamp, from_me, message_id
                 FROM messages WHERE instance_id = ?1 AND chat_jid = ?2
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![instance_id.as_str(), chat_jid], |row| {
                Ok(MessageRecord {
                    chat_jid: row.get(0)?,
                    sender_jid: row.get(1)?,
                    instance_id: InstanceId(row.get(2)?),
                    body: row.get(3)?,
                    timestamp: row.get(4)?,
                    from_me: row.get(5)?,
                    message_id: row.get(6)?,
                })
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}
