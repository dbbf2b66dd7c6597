// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact storage operations.

use rusqlite::{params, Row};

use super::{Session, StorageError};
use crate::model::{ColorSet, Contact};

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        name: row.get(2)?,
        colors: ColorSet {
            color: row.get(3)?,
            color_dark: row.get(4)?,
            color_light: row.get(5)?,
            color_accent: row.get(6)?,
        },
    })
}

impl Session<'_> {
    // === Contact Operations ===

    /// Inserts or replaces a contact keyed by phone number.
    pub fn upsert_contact(&self, contact: &Contact) -> Result<(), StorageError> {
        let c = contact.colors;
        self.conn.execute(
            "INSERT INTO contacts (phone_number, id, name, color, color_dark, color_light, color_accent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(phone_number) DO UPDATE SET
                id = excluded.id,
                name = excluded.name,
                color = excluded.color,
                color_dark = excluded.color_dark,
                color_light = excluded.color_light,
                color_accent = excluded.color_accent",
            params![
                contact.phone_number,
                contact.id,
                contact.name,
                c.color,
                c.color_dark,
                c.color_light,
                c.color_accent,
            ],
        )?;
        Ok(())
    }

    pub fn list_contacts(&self) -> Result<Vec<Contact>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phone_number, name, color, color_dark, color_light, color_accent
             FROM contacts ORDER BY name",
        )?;
        let rows = stmt.query_map([], row_to_contact)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_contact(&self, phone_number: &str) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "DELETE FROM contacts WHERE phone_number = ?1",
            params![phone_number],
        )?;
        Ok(changed > 0)
    }

    /// Deletes every contact whose id is in `ids`.
    pub fn delete_contacts_by_ids(&self, ids: &[i64]) -> Result<usize, StorageError> {
        let mut removed = 0;
        for id in ids {
            removed += self
                .conn
                .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        }
        Ok(removed)
    }
}
