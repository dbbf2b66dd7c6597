// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operation payloads as they appear in the `data` field of a notification.
//!
//! Entity-carrying operations (`added_message`, `added_conversation`, ...)
//! reuse the wire bodies from [`crate::remote::bodies`]. Fields marked
//! "encrypted" hold [`FieldCodec`](crate::crypto::FieldCodec) ciphertext.

use serde::{Deserialize, Serialize};

use crate::storage::SettingValue;

use super::ApplyError;

/// Payload naming a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityId {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedMessage {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub message_type: Option<i32>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(default)]
    pub seen: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessageType {
    pub id: i64,
    pub message_type: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupMessages {
    /// Messages strictly older than this Unix millisecond timestamp go.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupConversationMessages {
    pub conversation_id: i64,
    pub timestamp: i64,
}

/// Conversation fields changed on another device; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedConversation {
    pub id: i64,
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default)]
    pub private_notifications: Option<bool>,
    /// Encrypted.
    #[serde(default)]
    pub ringtone: Option<String>,
    #[serde(default)]
    pub led_color: Option<i32>,
    #[serde(default)]
    pub color: Option<i32>,
    #[serde(default)]
    pub color_dark: Option<i32>,
    #[serde(default)]
    pub color_light: Option<i32>,
    #[serde(default)]
    pub color_accent: Option<i32>,
    #[serde(default)]
    pub sim_subscription_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConversationTitle {
    pub id: i64,
    /// Encrypted.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConversationSnippet {
    pub id: i64,
    /// Encrypted.
    pub snippet: String,
    pub timestamp: i64,
}

/// A conversation read on some device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadConversation {
    pub id: i64,
    /// Device that originated the read.
    #[serde(default)]
    pub device_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConversation {
    pub id: i64,
    pub archive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedContact {
    /// Encrypted.
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedContactsById {
    pub ids: Vec<i64>,
}

/// Drafts of a conversation discarded on some device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedDrafts {
    /// Conversation id.
    pub id: i64,
    #[serde(default)]
    pub device_id: Option<i64>,
}

/// A synced preference. `value_type` is one of `boolean`, `integer`,
/// `long` or `string`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSetting {
    pub pref: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
}

impl UpdateSetting {
    /// Converts the loosely typed JSON value into a [`SettingValue`].
    pub fn setting_value(&self) -> Result<SettingValue, ApplyError> {
        let invalid = || {
            ApplyError::InvalidPayload(format!(
                "setting {} is not a valid {}",
                self.pref, self.value_type
            ))
        };
        match self.value_type.as_str() {
            "boolean" => self.value.as_bool().map(SettingValue::Boolean).ok_or_else(invalid),
            "integer" => self
                .value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(SettingValue::Integer)
                .ok_or_else(invalid),
            "long" => self.value.as_i64().map(SettingValue::Long).ok_or_else(invalid),
            "string" => self
                .value
                .as_str()
                .map(|v| SettingValue::String(v.to_string()))
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSubscription {
    #[serde(rename = "type")]
    pub subscription_type: i32,
    #[serde(default)]
    pub expiration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePrimaryDevice {
    pub new_primary_device_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub identifier: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissedNotification {
    /// Conversation id; absent when every notification was dismissed.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub device_id: Option<i64>,
}

/// A message composed elsewhere that the primary device must send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardToPhone {
    /// Encrypted, `", "`-joined recipients.
    pub to: String,
    /// Encrypted message text or media reference.
    pub message: String,
    /// Encrypted; plain text when absent.
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub account_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedAccount {
    /// Encrypted.
    #[serde(default)]
    pub real_name: Option<String>,
    /// Encrypted.
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setting_value_types() {
        let setting = UpdateSetting {
            pref: "dark_mode".into(),
            value_type: "boolean".into(),
            value: json!(true),
        };
        assert_eq!(setting.setting_value().unwrap(), SettingValue::Boolean(true));

        let setting = UpdateSetting {
            pref: "font_size".into(),
            value_type: "integer".into(),
            value: json!("large"),
        };
        assert!(setting.setting_value().is_err());
    }

    #[test]
    fn test_updated_message_fields_optional() {
        let parsed: UpdatedMessage = serde_json::from_str(r#"{"id": 4, "read": true}"#).unwrap();
        assert_eq!(parsed.id, 4);
        assert_eq!(parsed.read, Some(true));
        assert_eq!(parsed.message_type, None);
    }
}
