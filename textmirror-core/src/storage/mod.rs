// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent Storage Module
//!
//! The device-local message store. Sync code reaches it through a small
//! CRUD surface on [`Session`], obtained either for a read or inside a
//! transaction. Every insert used by sync is a compare-and-insert
//! (`INSERT OR IGNORE`) so concurrent or repeated applies of the same id
//! cannot produce duplicates.

mod account_state;
mod blacklists;
mod contacts;
mod conversations;
mod drafts;
mod error;
mod messages;
pub mod migration;
mod scheduled;

pub use account_state::{AccountState, SettingValue};
pub use conversations::ConversationUpdate;
pub use error::StorageError;
pub use messages::MessageUpdate;

use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;

use crate::model::{Conversation, Message};

/// SQLite-based storage implementation.
///
/// All access goes through one connection and one lock: a read waits for
/// any open transaction to finish.
pub struct Storage {
    conn: Mutex<Connection>,
}

/// CRUD view over an open connection or transaction.
pub struct Session<'c> {
    conn: &'c Connection,
}

impl<'c> Session<'c> {
    fn new(conn: &'c Connection) -> Self {
        Session { conn }
    }
}

impl Storage {
    /// Opens or creates a storage database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    /// Creates an in-memory storage (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migration::MigrationRunner::run(&conn, &migration::all_migrations())?;
        Ok(Storage {
            conn: Mutex::new(conn),
        })
    }

    /// Returns the current schema version.
    pub fn schema_version(&self) -> Result<u32, StorageError> {
        migration::MigrationRunner::current_version(&self.conn.lock())
    }

    /// Runs `f` against the store outside of an explicit transaction.
    pub fn read<T, E>(&self, f: impl FnOnce(&Session<'_>) -> Result<T, E>) -> Result<T, E> {
        let conn = self.conn.lock();
        f(&Session::new(&conn))
    }

    /// Runs `f` inside an immediate transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back
    /// otherwise, so a multi-step apply is all-or-nothing.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&Session<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;
        let value = f(&Session::new(&tx))?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    // === Shortcuts used by callers outside a sync run ===

    pub fn get_message(&self, id: i64) -> Result<Option<Message>, StorageError> {
        self.read(|s| s.get_message(id))
    }

    pub fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, StorageError> {
        self.read(|s| s.get_conversation(id))
    }

    pub fn count_messages(&self) -> Result<usize, StorageError> {
        self.read(|s| s.count_messages())
    }

    pub fn count_conversations(&self) -> Result<usize, StorageError> {
        self.read(|s| s.count_conversations())
    }
}

impl Session<'_> {
    /// Deletes every synced entity, leaving account state and settings.
    pub fn wipe_entities(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "DELETE FROM messages;
             DELETE FROM drafts;
             DELETE FROM conversations;
             DELETE FROM contacts;
             DELETE FROM blacklists;
             DELETE FROM scheduled_messages;",
        )?;
        Ok(())
    }

    /// Deletes every synced entity and all account-scoped state.
    pub fn wipe_account(&self) -> Result<(), StorageError> {
        self.wipe_entities()?;
        self.conn.execute_batch(
            "DELETE FROM account_state;
             DELETE FROM settings;
             DELETE FROM feature_flags;",
        )?;
        Ok(())
    }
}

/// Maps a boolean column.
fn flag(value: bool) -> i32 {
    value as i32
}
