// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use rusqlite::params;

use super::{Session, StorageError};
use crate::model::Draft;

impl Session<'_> {
    // === Draft Operations ===

    pub fn insert_draft(&self, draft: &Draft) -> Result<bool, StorageError> {
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO drafts (id, conversation_id, data, mime_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![draft.id, draft.conversation_id, draft.data, draft.mime_type],
        )?;
        Ok(written > 0)
    }

    /// Removes every draft of a conversation.
    pub fn delete_drafts_for_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<usize, StorageError> {
        Ok(self.conn.execute(
            "DELETE FROM drafts WHERE conversation_id = ?1",
            params![conversation_id],
        )?)
    }

    pub fn list_drafts(&self) -> Result<Vec<Draft>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, conversation_id, data, mime_type FROM drafts ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Draft {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                data: row.get(2)?,
                mime_type: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
