// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation storage operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{flag, Session, StorageError};
use crate::model::{id_matcher, ColorSet, Conversation};

const CONVERSATION_COLUMNS: &str = "id, title, phone_numbers, snippet, timestamp, read, pinned,
     archived, muted, private_notifications, ringtone_uri, led_color, color, color_dark,
     color_light, color_accent, sim_subscription_id, id_matcher, image_uri";

/// Partial update of a conversation; `None` leaves the column untouched.
///
/// Setting `phone_numbers` also recomputes the stored `id_matcher`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub phone_numbers: Option<String>,
    pub snippet: Option<String>,
    pub timestamp: Option<i64>,
    pub read: Option<bool>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
    pub muted: Option<bool>,
    pub private_notifications: Option<bool>,
    pub ringtone_uri: Option<String>,
    pub led_color: Option<i32>,
    pub colors: Option<ColorSet>,
    pub sim_subscription_id: Option<i32>,
}

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        phone_numbers: row.get(2)?,
        snippet: row.get(3)?,
        timestamp: row.get(4)?,
        read: row.get::<_, i32>(5)? != 0,
        pinned: row.get::<_, i32>(6)? != 0,
        archived: row.get::<_, i32>(7)? != 0,
        muted: row.get::<_, i32>(8)? != 0,
        private_notifications: row.get::<_, i32>(9)? != 0,
        ringtone_uri: row.get(10)?,
        led_color: row.get(11)?,
        colors: ColorSet {
            color: row.get(12)?,
            color_dark: row.get(13)?,
            color_light: row.get(14)?,
            color_accent: row.get(15)?,
        },
        sim_subscription_id: row.get(16)?,
        id_matcher: row.get(17)?,
        image_uri: row.get(18)?,
    })
}

impl Session<'_> {
    // === Conversation Operations ===

    /// Inserts a conversation unless its id or its `id_matcher` is taken.
    ///
    /// The matcher is always recomputed from `phone_numbers` so that every
    /// device stores the same key. Returns true if a row was written.
    pub fn insert_conversation(&self, conversation: &Conversation) -> Result<bool, StorageError> {
        let matcher = id_matcher(&conversation.phone_numbers);
        let colors = conversation.colors;
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO conversations
             (id, title, phone_numbers, snippet, timestamp, read, pinned, archived, muted,
              private_notifications, ringtone_uri, led_color, color, color_dark, color_light,
              color_accent, sim_subscription_id, id_matcher, image_uri)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19)",
            params![
                conversation.id,
                conversation.title,
                conversation.phone_numbers,
                conversation.snippet,
                conversation.timestamp,
                flag(conversation.read),
                flag(conversation.pinned),
                flag(conversation.archived),
                flag(conversation.muted),
                flag(conversation.private_notifications),
                conversation.ringtone_uri,
                conversation.led_color,
                colors.color,
                colors.color_dark,
                colors.color_light,
                colors.color_accent,
                conversation.sim_subscription_id,
                matcher,
                conversation.image_uri,
            ],
        )?;
        Ok(written > 0)
    }

    pub fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, StorageError> {
        let sql = format!(
            "SELECT {} FROM conversations WHERE id = ?1",
            CONVERSATION_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_conversation)
            .optional()?)
    }

    /// Looks up a conversation by the group key of a participant list.
    pub fn find_conversation_by_phone_numbers(
        &self,
        phone_numbers: &str,
    ) -> Result<Option<Conversation>, StorageError> {
        let sql = format!(
            "SELECT {} FROM conversations WHERE id_matcher = ?1",
            CONVERSATION_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![id_matcher(phone_numbers)], row_to_conversation)
            .optional()?)
    }

    /// Lists conversations, pinned first, then newest first.
    pub fn list_conversations(&self) -> Result<Vec<Conversation>, StorageError> {
        let sql = format!(
            "SELECT {} FROM conversations ORDER BY pinned DESC, timestamp DESC",
            CONVERSATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_conversation)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_conversations(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Applies a partial update. Returns false if the conversation is absent.
    pub fn update_conversation(
        &self,
        id: i64,
        update: &ConversationUpdate,
    ) -> Result<bool, StorageError> {
        let matcher = update.phone_numbers.as_deref().map(id_matcher);
        let colors = update.colors;
        let changed = self.conn.execute(
            "UPDATE conversations
             SET title = COALESCE(?1, title),
                 phone_numbers = COALESCE(?2, phone_numbers),
                 id_matcher = COALESCE(?3, id_matcher),
                 snippet = COALESCE(?4, snippet),
                 timestamp = COALESCE(?5, timestamp),
                 read = COALESCE(?6, read),
                 pinned = COALESCE(?7, pinned),
                 archived = COALESCE(?8, archived),
                 muted = COALESCE(?9, muted),
                 private_notifications = COALESCE(?10, private_notifications),
                 ringtone_uri = COALESCE(?11, ringtone_uri),
                 led_color = COALESCE(?12, led_color),
                 color = COALESCE(?13, color),
                 color_dark = COALESCE(?14, color_dark),
                 color_light = COALESCE(?15, color_light),
                 color_accent = COALESCE(?16, color_accent),
                 sim_subscription_id = COALESCE(?17, sim_subscription_id)
             WHERE id = ?18",
            params![
                update.title,
                update.phone_numbers,
                matcher,
                update.snippet,
                update.timestamp,
                update.read.map(flag),
                update.pinned.map(flag),
                update.archived.map(flag),
                update.muted.map(flag),
                update.private_notifications.map(flag),
                update.ringtone_uri,
                update.led_color,
                colors.map(|c| c.color),
                colors.map(|c| c.color_dark),
                colors.map(|c| c.color_light),
                colors.map(|c| c.color_accent),
                update.sim_subscription_id,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Sets the snippet and timestamp shown in the conversation list.
    pub fn update_conversation_snippet(
        &self,
        id: i64,
        snippet: &str,
        timestamp: i64,
    ) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE conversations SET snippet = ?1, timestamp = ?2 WHERE id = ?3",
            params![snippet, timestamp, id],
        )?;
        Ok(changed > 0)
    }

    /// Deletes a conversation with its messages and drafts.
    pub fn delete_conversation(&self, id: i64) -> Result<bool, StorageError> {
        self.conn
            .execute("DELETE FROM messages WHERE conversation_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM drafts WHERE conversation_id = ?1", params![id])?;
        let changed = self
            .conn
            .execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
