// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Failures of the local store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value (setting, enum code) could not be decoded.
    #[error("cannot decode stored value: {0}")]
    Serialization(String),

    #[error("migration failed: {0}")]
    Migration(String),
}
