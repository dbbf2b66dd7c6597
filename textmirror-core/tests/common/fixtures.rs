// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Accounts, entities and notifications with fixed ids and keys so that
//! assertions can name them directly.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use textmirror_core::apply::Notification;
use textmirror_core::crypto::SymmetricKey;
use textmirror_core::model::{
    Blacklist, ColorSet, Contact, Conversation, Draft, Message, MessageType, ScheduledMessage,
    MIME_TEXT_PLAIN,
};
use textmirror_core::remote::{ConversationBody, MessageBody};
use textmirror_core::{AccountContext, CallbackHandler, EventDispatcher, Storage, SyncEvent};

pub const ACCOUNT_ID: &str = "acct-1";
pub const PRIMARY_DEVICE: i64 = 1;
pub const SECONDARY_DEVICE: i64 = 2;

// ============================================================
// Accounts
// ============================================================

pub fn account_key() -> SymmetricKey {
    SymmetricKey::from_bytes([7u8; 32])
}

pub fn other_key() -> SymmetricKey {
    SymmetricKey::from_bytes([9u8; 32])
}

/// Context of the phone that actually sends and receives SMS.
pub fn primary_ctx() -> AccountContext {
    AccountContext::new(ACCOUNT_ID, PRIMARY_DEVICE, true, account_key()).unwrap()
}

/// Context of a mirroring device (tablet, desktop).
pub fn secondary_ctx() -> AccountContext {
    AccountContext::new(ACCOUNT_ID, SECONDARY_DEVICE, false, account_key()).unwrap()
}

pub fn storage() -> Arc<Storage> {
    Arc::new(Storage::in_memory().unwrap())
}

// ============================================================
// Entities
// ============================================================

pub fn text_message(id: i64, conversation_id: i64, timestamp: i64, data: &str) -> Message {
    Message {
        id,
        conversation_id,
        message_type: MessageType::Received,
        timestamp,
        mime_type: MIME_TEXT_PLAIN.to_string(),
        data: data.to_string(),
        read: false,
        seen: false,
        from: None,
        color: None,
        sent_device_id: None,
    }
}

pub fn media_message(id: i64, conversation_id: i64, timestamp: i64, data: &str) -> Message {
    Message {
        mime_type: "image/jpeg".to_string(),
        ..text_message(id, conversation_id, timestamp, data)
    }
}

pub fn conversation(id: i64, phone_numbers: &str, timestamp: i64) -> Conversation {
    Conversation::new(id, phone_numbers, timestamp)
}

pub fn contact(id: i64, phone_number: &str, name: &str) -> Contact {
    Contact {
        id,
        phone_number: phone_number.to_string(),
        name: name.to_string(),
        colors: ColorSet::default(),
    }
}

pub fn draft(id: i64, conversation_id: i64, data: &str) -> Draft {
    Draft {
        id,
        conversation_id,
        data: data.to_string(),
        mime_type: MIME_TEXT_PLAIN.to_string(),
    }
}

pub fn blacklist(id: i64, phone_number: &str) -> Blacklist {
    Blacklist {
        id,
        phone_number: phone_number.to_string(),
    }
}

pub fn scheduled(id: i64, to: &str, timestamp: i64) -> ScheduledMessage {
    ScheduledMessage {
        id,
        to: to.to_string(),
        data: "see you".to_string(),
        mime_type: MIME_TEXT_PLAIN.to_string(),
        timestamp,
        title: to.to_string(),
    }
}

// ============================================================
// Wire bodies and notifications
// ============================================================

pub fn sealed_message(message: &Message) -> MessageBody {
    MessageBody::seal(message, primary_ctx().codec()).unwrap()
}

pub fn sealed_conversation(conversation: &Conversation) -> ConversationBody {
    ConversationBody::seal(conversation, primary_ctx().codec()).unwrap()
}

pub fn notification<T: Serialize>(operation: &str, payload: &T) -> Notification {
    Notification::with_payload(operation, payload).unwrap()
}

/// Encrypts a display string the way another device would.
pub fn enc(plaintext: &str) -> String {
    primary_ctx().codec().encrypt(plaintext).unwrap()
}

/// A dispatcher that records every event it sees.
pub fn event_recorder() -> (EventDispatcher, Arc<Mutex<Vec<SyncEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(CallbackHandler::new(move |event| {
        sink.lock().push(event)
    })));
    (events, seen)
}
