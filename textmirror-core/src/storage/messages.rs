// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message storage operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{flag, Session, StorageError};
use crate::model::{Message, MessageType, MIME_TEXT_PLAIN, PLACEHOLDER_PREFIX};

const MESSAGE_COLUMNS: &str = "id, conversation_id, message_type, timestamp, mime_type, data,
     read, seen, message_from, color, sent_device_id";

/// Partial update of a message; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub message_type: Option<MessageType>,
    pub timestamp: Option<i64>,
    pub read: Option<bool>,
    pub seen: Option<bool>,
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let code: i32 = row.get(2)?;
    let message_type = MessageType::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Integer,
            format!("unknown message type {}", code).into(),
        )
    })?;

    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        message_type,
        timestamp: row.get(3)?,
        mime_type: row.get(4)?,
        data: row.get(5)?,
        read: row.get::<_, i32>(6)? != 0,
        seen: row.get::<_, i32>(7)? != 0,
        from: row.get(8)?,
        color: row.get(9)?,
        sent_device_id: row.get(10)?,
    })
}

impl Session<'_> {
    // === Message Operations ===

    /// Inserts a message unless one with the same id exists.
    ///
    /// Returns true if a row was written.
    pub fn insert_message(&self, message: &Message) -> Result<bool, StorageError> {
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO messages
             (id, conversation_id, message_type, timestamp, mime_type, data,
              read, seen, message_from, color, sent_device_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                message.id,
                message.conversation_id,
                message.message_type.code(),
                message.timestamp,
                message.mime_type,
                message.data,
                flag(message.read),
                flag(message.seen),
                message.from,
                message.color,
                message.sent_device_id,
            ],
        )?;
        Ok(written > 0)
    }

    /// Inserts many messages, skipping ids already present.
    ///
    /// Returns the number of rows written.
    pub fn insert_messages(&self, messages: &[Message]) -> Result<usize, StorageError> {
        let mut written = 0;
        for message in messages {
            if self.insert_message(message)? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Loads a message by ID.
    pub fn get_message(&self, id: i64) -> Result<Option<Message>, StorageError> {
        let sql = format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_message)
            .optional()?)
    }

    /// Returns the newest message of a conversation.
    pub fn latest_message(&self, conversation_id: i64) -> Result<Option<Message>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages WHERE conversation_id = ?1
             ORDER BY timestamp DESC, id DESC LIMIT 1",
            MESSAGE_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![conversation_id], row_to_message)
            .optional()?)
    }

    /// Paged scan over all messages, oldest first.
    pub fn list_messages_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages ORDER BY timestamp ASC, id ASC LIMIT ?1 OFFSET ?2",
            MESSAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], row_to_message)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Lists all messages, oldest first.
    pub fn list_messages(&self) -> Result<Vec<Message>, StorageError> {
        self.list_messages_page(0, i64::MAX as usize)
    }

    pub fn count_messages(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Newest media messages still holding a placeholder reference.
    pub fn pending_media_messages(&self, limit: usize) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages
             WHERE lower(mime_type) != ?1 AND data LIKE ?2
             ORDER BY timestamp DESC LIMIT ?3",
            MESSAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pattern = format!("{}%", PLACEHOLDER_PREFIX);
        let rows = stmt.query_map(params![MIME_TEXT_PLAIN, pattern, limit as i64], row_to_message)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Newest media messages whose bytes are available locally.
    pub fn local_media_messages(&self, limit: usize) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages
             WHERE lower(mime_type) != ?1 AND data NOT LIKE ?2
             ORDER BY timestamp DESC LIMIT ?3",
            MESSAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let pattern = format!("{}%", PLACEHOLDER_PREFIX);
        let rows = stmt.query_map(params![MIME_TEXT_PLAIN, pattern, limit as i64], row_to_message)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Applies a partial update. Returns false if the message is absent.
    pub fn update_message(&self, id: i64, update: &MessageUpdate) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE messages
             SET message_type = COALESCE(?1, message_type),
                 timestamp = COALESCE(?2, timestamp),
                 read = COALESCE(?3, read),
                 seen = COALESCE(?4, seen)
             WHERE id = ?5",
            params![
                update.message_type.map(MessageType::code),
                update.timestamp,
                update.read.map(flag),
                update.seen.map(flag),
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Rewrites the payload of a message, e.g. once its attachment is local.
    pub fn update_message_data(&self, id: i64, data: &str) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE messages SET data = ?1 WHERE id = ?2",
            params![data, id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_message(&self, id: i64) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Deletes every message older than `timestamp`.
    pub fn delete_messages_before(&self, timestamp: i64) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "DELETE FROM messages WHERE timestamp < ?1",
            params![timestamp],
        )?)
    }

    /// Deletes the messages of one conversation older than `timestamp`.
    pub fn delete_conversation_messages_before(
        &self,
        conversation_id: i64,
        timestamp: i64,
    ) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "DELETE FROM messages WHERE conversation_id = ?1 AND timestamp < ?2",
            params![conversation_id, timestamp],
        )?)
    }

    /// Marks every message of a conversation read and seen.
    pub fn mark_conversation_messages_read(
        &self,
        conversation_id: i64,
    ) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "UPDATE messages SET read = 1, seen = 1
             WHERE conversation_id = ?1 AND (read = 0 OR seen = 0)",
            params![conversation_id],
        )?)
    }

    /// Marks every message of a conversation seen.
    pub fn mark_conversation_messages_seen(
        &self,
        conversation_id: i64,
    ) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "UPDATE messages SET seen = 1 WHERE conversation_id = ?1 AND seen = 0",
            params![conversation_id],
        )?)
    }

    /// Marks every message in the store seen.
    pub fn mark_all_messages_seen(&self) -> Result<usize, StorageError> {
        Ok(self
            .conn
            .execute("UPDATE messages SET seen = 1 WHERE seen = 0", [])?)
    }
}
