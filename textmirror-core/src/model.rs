// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Data Model
//!
//! Plaintext entities as they live in the local store. The encrypted wire
//! representations are in [`crate::remote::bodies`].

use serde::{Deserialize, Serialize};

/// Mime type of plain-text message bodies. Anything else is media.
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// Prefix of a placeholder reference standing in for binary content.
pub const PLACEHOLDER_PREFIX: &str = "firebase ";

/// Placeholder written for media whose bytes travel through blob storage.
pub const PENDING_MEDIA_DATA: &str = "firebase -1";

/// Returns true if the mime type denotes plain text.
pub fn is_text_mime(mime_type: &str) -> bool {
    mime_type.eq_ignore_ascii_case(MIME_TEXT_PLAIN)
}

/// Returns true if `data` is a placeholder reference.
pub fn is_placeholder(data: &str) -> bool {
    data.starts_with(PLACEHOLDER_PREFIX)
}

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Received,
    Sent,
    Sending,
    Error,
    Delivered,
    Info,
}

impl MessageType {
    /// Wire and storage code.
    pub fn code(self) -> i32 {
        match self {
            MessageType::Received => 0,
            MessageType::Sent => 1,
            MessageType::Sending => 2,
            MessageType::Error => 3,
            MessageType::Delivered => 4,
            MessageType::Info => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(MessageType::Received),
            1 => Some(MessageType::Sent),
            2 => Some(MessageType::Sending),
            3 => Some(MessageType::Error),
            4 => Some(MessageType::Delivered),
            5 => Some(MessageType::Info),
            _ => None,
        }
    }

    /// Returns true for messages written by the account owner.
    pub fn is_outgoing(self) -> bool {
        !matches!(self, MessageType::Received | MessageType::Info)
    }
}

/// Per-conversation or per-contact color set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorSet {
    pub color: i32,
    pub color_dark: i32,
    pub color_light: i32,
    pub color_accent: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub message_type: MessageType,
    pub timestamp: i64,
    pub mime_type: String,
    pub data: String,
    pub read: bool,
    pub seen: bool,
    pub from: Option<String>,
    pub color: Option<i32>,
    pub sent_device_id: Option<i64>,
}

impl Message {
    /// Returns true if the message carries media rather than text.
    pub fn is_media(&self) -> bool {
        !is_text_mime(&self.mime_type)
    }

    /// Returns true if the media bytes have not been fetched yet.
    pub fn is_pending_media(&self) -> bool {
        self.is_media() && is_placeholder(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub phone_numbers: String,
    pub snippet: Option<String>,
    pub timestamp: i64,
    pub read: bool,
    pub pinned: bool,
    pub archived: bool,
    pub muted: bool,
    pub private_notifications: bool,
    pub ringtone_uri: Option<String>,
    pub led_color: i32,
    pub colors: ColorSet,
    pub sim_subscription_id: Option<i32>,
    pub id_matcher: String,
    pub image_uri: Option<String>,
}

impl Conversation {
    /// Creates a conversation titled by its participants.
    pub fn new(id: i64, phone_numbers: impl Into<String>, timestamp: i64) -> Self {
        let phone_numbers = phone_numbers.into();
        Conversation {
            id,
            title: phone_numbers.clone(),
            id_matcher: id_matcher(&phone_numbers),
            phone_numbers,
            snippet: None,
            timestamp,
            read: true,
            pinned: false,
            archived: false,
            muted: false,
            private_notifications: false,
            ringtone_uri: None,
            led_color: 0,
            colors: ColorSet::default(),
            sim_subscription_id: None,
            image_uri: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    pub colors: ColorSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: i64,
    pub conversation_id: i64,
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    pub id: i64,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: i64,
    pub to: String,
    pub data: String,
    pub mime_type: String,
    pub timestamp: i64,
    pub title: String,
}

/// Subscription tier reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionType {
    None,
    Trial,
    Subscriber,
    Lifetime,
    Other(i32),
}

impl SubscriptionType {
    pub fn code(self) -> i32 {
        match self {
            SubscriptionType::None => 0,
            SubscriptionType::Trial => 1,
            SubscriptionType::Subscriber => 2,
            SubscriptionType::Lifetime => 3,
            SubscriptionType::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SubscriptionType::None,
            1 => SubscriptionType::Trial,
            2 => SubscriptionType::Subscriber,
            3 => SubscriptionType::Lifetime,
            other => SubscriptionType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub kind: SubscriptionType,
    /// Expiration as Unix milliseconds, 0 when it never expires.
    pub expiration: i64,
}

/// Number of trailing digits that identify a phone number across formats.
const MATCHER_DIGITS: usize = 7;

/// Computes the order-independent group key for a list of participants.
///
/// Each `", "`-separated entry is reduced to its last seven digits (or to
/// its lowercased text for non-numeric addresses such as email), then the
/// set is sorted and joined with `,`. Two devices that create "the same"
/// conversation independently therefore produce the same matcher, and
/// different participant sets never do.
pub fn id_matcher(phone_numbers: &str) -> String {
    let mut parts: Vec<String> = phone_numbers
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let digits: String = p.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                p.to_lowercase()
            } else if digits.len() > MATCHER_DIGITS {
                digits[digits.len() - MATCHER_DIGITS..].to_string()
            } else {
                digits
            }
        })
        .collect();
    parts.sort();
    parts.dedup();
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_matcher_is_order_independent() {
        assert_eq!(
            id_matcher("+1 (555) 123-4567, 555-765-4321"),
            id_matcher("5557654321, 15551234567")
        );
    }

    #[test]
    fn test_id_matcher_separates_short_entries() {
        assert_ne!(id_matcher("12, 345"), id_matcher("1234, 5"));
        assert_eq!(id_matcher("345, 12"), "12,345");
    }

    #[test]
    fn test_id_matcher_keeps_email_addresses() {
        assert_eq!(id_matcher("Bob@Example.com"), "bob@example.com");
    }

    #[test]
    fn test_message_type_codes_roundtrip() {
        for code in 0..6 {
            let ty = MessageType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert_eq!(MessageType::from_code(42), None);
    }

    #[test]
    fn test_pending_media_detection() {
        let msg = Message {
            id: 1,
            conversation_id: 1,
            message_type: MessageType::Received,
            timestamp: 0,
            mime_type: "image/jpeg".into(),
            data: PENDING_MEDIA_DATA.into(),
            read: false,
            seen: false,
            from: None,
            color: None,
            sent_device_id: None,
        };
        assert!(msg.is_pending_media());
    }
}
