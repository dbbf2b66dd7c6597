// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use rusqlite::{params, Row};

use super::{Session, StorageError};
use crate::model::ScheduledMessage;

fn row_to_scheduled(row: &Row<'_>) -> rusqlite::Result<ScheduledMessage> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        to: row.get(1)?,
        data: row.get(2)?,
        mime_type: row.get(3)?,
        timestamp: row.get(4)?,
        title: row.get(5)?,
    })
}

impl Session<'_> {
    // === Scheduled Message Operations ===

    pub fn insert_scheduled(&self, scheduled: &ScheduledMessage) -> Result<bool, StorageError> {
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO scheduled_messages
             (id, recipient, data, mime_type, timestamp, title)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                scheduled.id,
                scheduled.to,
                scheduled.data,
                scheduled.mime_type,
                scheduled.timestamp,
                scheduled.title,
            ],
        )?;
        Ok(written > 0)
    }

    /// Overwrites a scheduled message. Returns false if it is absent.
    pub fn update_scheduled(&self, scheduled: &ScheduledMessage) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE scheduled_messages
             SET recipient = ?1, data = ?2, mime_type = ?3, timestamp = ?4, title = ?5
             WHERE id = ?6",
            params![
                scheduled.to,
                scheduled.data,
                scheduled.mime_type,
                scheduled.timestamp,
                scheduled.title,
                scheduled.id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_scheduled(&self, id: i64) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM scheduled_messages WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn list_scheduled(&self) -> Result<Vec<ScheduledMessage>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient, data, mime_type, timestamp, title
             FROM scheduled_messages ORDER BY timestamp",
        )?;
        let rows = stmt.query_map([], row_to_scheduled)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
