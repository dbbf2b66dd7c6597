// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account-scoped state: primary flag, subscription, profile, settings and
//! feature flags. Single row in `account_state`, key/value rows elsewhere.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{flag, Session, StorageError};
use crate::model::{Subscription, SubscriptionType};

/// Persisted account state of this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub is_primary: bool,
    pub subscription: Subscription,
    pub real_name: Option<String>,
    pub phone_number: Option<String>,
}

impl Default for AccountState {
    fn default() -> Self {
        AccountState {
            is_primary: false,
            subscription: Subscription {
                kind: SubscriptionType::None,
                expiration: 0,
            },
            real_name: None,
            phone_number: None,
        }
    }
}

/// Typed value of a synced setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    String(String),
}

impl SettingValue {
    fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Boolean(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::Long(_) => "long",
            SettingValue::String(_) => "string",
        }
    }

    fn encode(&self) -> String {
        match self {
            SettingValue::Boolean(v) => v.to_string(),
            SettingValue::Integer(v) => v.to_string(),
            SettingValue::Long(v) => v.to_string(),
            SettingValue::String(v) => v.clone(),
        }
    }

    fn decode(type_name: &str, raw: String) -> Result<Self, StorageError> {
        let parsed = match type_name {
            "boolean" => raw.parse().ok().map(SettingValue::Boolean),
            "integer" => raw.parse().ok().map(SettingValue::Integer),
            "long" => raw.parse().ok().map(SettingValue::Long),
            "string" => Some(SettingValue::String(raw.clone())),
            _ => None,
        };
        parsed.ok_or_else(|| {
            StorageError::Serialization(format!("invalid {} setting: {:?}", type_name, raw))
        })
    }
}

impl Session<'_> {
    // === Account State ===

    /// Loads the account state, or defaults when nothing was stored yet.
    pub fn load_account_state(&self) -> Result<AccountState, StorageError> {
        let state = self
            .conn
            .query_row(
                "SELECT is_primary, subscription_type, subscription_expiration, real_name, phone_number
                 FROM account_state WHERE id = 1",
                [],
                |row| {
                    Ok(AccountState {
                        is_primary: row.get::<_, i32>(0)? != 0,
                        subscription: Subscription {
                            kind: SubscriptionType::from_code(row.get(1)?),
                            expiration: row.get(2)?,
                        },
                        real_name: row.get(3)?,
                        phone_number: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(state.unwrap_or_default())
    }

    fn ensure_account_row(&self) -> Result<(), StorageError> {
        self.conn
            .execute("INSERT OR IGNORE INTO account_state (id) VALUES (1)", [])?;
        Ok(())
    }

    pub fn set_primary(&self, is_primary: bool) -> Result<(), StorageError> {
        self.ensure_account_row()?;
        self.conn.execute(
            "UPDATE account_state SET is_primary = ?1 WHERE id = 1",
            params![flag(is_primary)],
        )?;
        Ok(())
    }

    pub fn set_subscription(&self, subscription: Subscription) -> Result<(), StorageError> {
        self.ensure_account_row()?;
        self.conn.execute(
            "UPDATE account_state SET subscription_type = ?1, subscription_expiration = ?2
             WHERE id = 1",
            params![subscription.kind.code(), subscription.expiration],
        )?;
        Ok(())
    }

    /// Stores the profile name and phone number; `None` keeps the old value.
    pub fn set_profile(
        &self,
        real_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<(), StorageError> {
        self.ensure_account_row()?;
        self.conn.execute(
            "UPDATE account_state
             SET real_name = COALESCE(?1, real_name), phone_number = COALESCE(?2, phone_number)
             WHERE id = 1",
            params![real_name, phone_number],
        )?;
        Ok(())
    }

    pub fn put_setting(&self, key: &str, value: &SettingValue) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO settings (key, value, value_type) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, value_type = excluded.value_type",
            params![key, value.encode(), value.type_name()],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<SettingValue>, StorageError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, value_type FROM settings WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(raw, type_name)| SettingValue::decode(&type_name, raw))
            .transpose()
    }

    pub fn set_feature_flag(&self, identifier: &str, enabled: bool) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO feature_flags (identifier, enabled) VALUES (?1, ?2)
             ON CONFLICT(identifier) DO UPDATE SET enabled = excluded.enabled",
            params![identifier, flag(enabled)],
        )?;
        Ok(())
    }

    /// Returns the flag state, or `None` when the server never sent it.
    pub fn feature_flag(&self, identifier: &str) -> Result<Option<bool>, StorageError> {
        let enabled: Option<i32> = self
            .conn
            .query_row(
                "SELECT enabled FROM feature_flags WHERE identifier = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled.map(|e| e != 0))
    }
}
