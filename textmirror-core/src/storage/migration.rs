// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Schema Migrations
//!
//! Each step has a version, a name and either SQL or a Rust callback for
//! data rewrites SQL cannot express. Applied versions are recorded in
//! `schema_version`; pending steps run in order inside one exclusive
//! transaction, so a failing step leaves the schema where it was.

use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use super::StorageError;
use crate::model::id_matcher;

/// A single schema migration step.
pub struct Migration {
    /// Starts at 1 and grows by one per step.
    pub version: u32,
    pub name: &'static str,
    pub action: MigrationAction,
}

pub enum MigrationAction {
    Sql(&'static str),
    Callback(fn(&Connection) -> Result<(), StorageError>),
}

impl Migration {
    fn apply(&self, conn: &Connection) -> Result<(), StorageError> {
        let result = match &self.action {
            MigrationAction::Sql(sql) => conn.execute_batch(sql).map_err(StorageError::from),
            MigrationAction::Callback(callback) => callback(conn),
        };
        result.map_err(|e| {
            StorageError::Migration(format!("v{} '{}' failed: {}", self.version, self.name, e))
        })
    }
}

const SCHEMA_VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);";

fn unix_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Brings a database up to the latest schema.
pub struct MigrationRunner;

impl MigrationRunner {
    /// Applies every migration newer than the recorded version.
    pub fn run(conn: &Connection, migrations: &[Migration]) -> Result<(), StorageError> {
        conn.execute_batch(SCHEMA_VERSION_TABLE)?;
        let current = Self::current_version(conn)?;

        let pending: Vec<&Migration> =
            migrations.iter().filter(|m| m.version > current).collect();
        if let Some(pair) = pending.windows(2).find(|w| w[0].version >= w[1].version) {
            return Err(StorageError::Migration(format!(
                "v{} is listed before v{}",
                pair[0].version, pair[1].version
            )));
        }
        if pending.is_empty() {
            return Ok(());
        }

        // Dropping `tx` on an early return rolls everything back.
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Exclusive)?;
        for migration in pending {
            migration.apply(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![migration.version, unix_seconds()],
            )?;
            tracing::debug!(
                version = migration.version,
                name = migration.name,
                "applied migration"
            );
        }
        tx.commit()?;
        Ok(())
    }

    /// Highest applied version, 0 for a fresh database.
    pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
        let tracked: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master
                            WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !tracked {
            return Ok(0);
        }
        let version: Option<u32> =
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        Ok(version.unwrap_or(0))
    }
}

/// Every migration, oldest first. New steps go at the end.
pub fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "baseline_schema",
            action: MigrationAction::Sql(MIGRATION_V1_BASELINE),
        },
        Migration {
            version: 2,
            name: "conversation_id_matcher",
            action: MigrationAction::Callback(migrate_v2_id_matcher),
        },
        Migration {
            version: 3,
            name: "unique_id_matcher",
            action: MigrationAction::Sql(MIGRATION_V3_UNIQUE_ID_MATCHER),
        },
        Migration {
            version: 4,
            name: "separated_id_matcher",
            action: MigrationAction::Callback(recompute_id_matchers),
        },
    ]
}

const MIGRATION_V1_BASELINE: &str = "
CREATE TABLE messages (
    id INTEGER PRIMARY KEY,
    conversation_id INTEGER NOT NULL,
    message_type INTEGER NOT NULL,
    timestamp INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    data TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    seen INTEGER NOT NULL DEFAULT 0,
    message_from TEXT,
    color INTEGER,
    sent_device_id INTEGER
);
CREATE INDEX idx_messages_conversation ON messages (conversation_id, timestamp);

CREATE TABLE conversations (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    phone_numbers TEXT NOT NULL,
    snippet TEXT,
    timestamp INTEGER NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    pinned INTEGER NOT NULL DEFAULT 0,
    archived INTEGER NOT NULL DEFAULT 0,
    muted INTEGER NOT NULL DEFAULT 0,
    private_notifications INTEGER NOT NULL DEFAULT 0,
    ringtone_uri TEXT,
    led_color INTEGER NOT NULL DEFAULT 0,
    color INTEGER NOT NULL DEFAULT 0,
    color_dark INTEGER NOT NULL DEFAULT 0,
    color_light INTEGER NOT NULL DEFAULT 0,
    color_accent INTEGER NOT NULL DEFAULT 0,
    sim_subscription_id INTEGER,
    image_uri TEXT
);

CREATE TABLE contacts (
    phone_number TEXT PRIMARY KEY,
    id INTEGER NOT NULL,
    name TEXT NOT NULL,
    color INTEGER NOT NULL DEFAULT 0,
    color_dark INTEGER NOT NULL DEFAULT 0,
    color_light INTEGER NOT NULL DEFAULT 0,
    color_accent INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX idx_contacts_id ON contacts (id);

CREATE TABLE drafts (
    id INTEGER PRIMARY KEY,
    conversation_id INTEGER NOT NULL,
    data TEXT NOT NULL,
    mime_type TEXT NOT NULL
);

CREATE TABLE blacklists (
    id INTEGER PRIMARY KEY,
    phone_number TEXT NOT NULL
);

CREATE TABLE scheduled_messages (
    id INTEGER PRIMARY KEY,
    recipient TEXT NOT NULL,
    data TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    title TEXT NOT NULL
);

CREATE TABLE account_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    is_primary INTEGER NOT NULL DEFAULT 0,
    subscription_type INTEGER NOT NULL DEFAULT 0,
    subscription_expiration INTEGER NOT NULL DEFAULT 0,
    real_name TEXT,
    phone_number TEXT
);

CREATE TABLE settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    value_type TEXT NOT NULL
);

CREATE TABLE feature_flags (
    identifier TEXT PRIMARY KEY,
    enabled INTEGER NOT NULL
);
";

/// Migration v2: add `id_matcher` and backfill it for existing conversations.
fn migrate_v2_id_matcher(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "ALTER TABLE conversations ADD COLUMN id_matcher TEXT NOT NULL DEFAULT '';",
    )?;
    recompute_id_matchers(conn)
}

/// Rewrites every stored `id_matcher` with the current [`id_matcher`] rules.
///
/// Migration v4 runs this because keys written before v4 joined entries
/// without a separator.
fn recompute_id_matchers(conn: &Connection) -> Result<(), StorageError> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare("SELECT id, phone_numbers FROM conversations")?;
        let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        mapped.collect::<Result<Vec<_>, _>>()?
    };

    for (id, phone_numbers) in rows {
        conn.execute(
            "UPDATE conversations SET id_matcher = ?1 WHERE id = ?2",
            params![id_matcher(&phone_numbers), id],
        )?;
    }
    Ok(())
}

const MIGRATION_V3_UNIQUE_ID_MATCHER: &str = "
CREATE UNIQUE INDEX idx_conversations_id_matcher ON conversations (id_matcher);
";
