// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use rusqlite::params;

use super::{Session, StorageError};
use crate::model::Blacklist;

impl Session<'_> {
    // === Blacklist Operations ===

    pub fn insert_blacklist(&self, blacklist: &Blacklist) -> Result<bool, StorageError> {
        let written = self.conn.execute(
            "INSERT OR IGNORE INTO blacklists (id, phone_number) VALUES (?1, ?2)",
            params![blacklist.id, blacklist.phone_number],
        )?;
        Ok(written > 0)
    }

    pub fn delete_blacklist(&self, id: i64) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM blacklists WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn list_blacklists(&self) -> Result<Vec<Blacklist>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, phone_number FROM blacklists ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Blacklist {
                id: row.get(0)?,
                phone_number: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
