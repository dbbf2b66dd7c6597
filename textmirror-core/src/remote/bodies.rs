// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Bodies
//!
//! Server-side representation of each entity. Ids, timestamps, flags and
//! colors travel in the clear; every user-authored string is an encrypted
//! field (see [`FieldCodec`]). `seal` encrypts a local entity, `open`
//! decrypts a body back and fails on the first field that does not decrypt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{DecryptionError, EncryptionError, FieldCodec};
use crate::model::{
    id_matcher, is_text_mime, Blacklist, ColorSet, Contact, Conversation, Draft, Message,
    MessageType, ScheduledMessage,
};

/// Errors turning a wire body into a local entity.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("unknown message type code {0}")]
    UnknownMessageType(i32),
}

/// Upload request for one entity collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRequest<T> {
    pub account_id: String,
    pub entities: Vec<T>,
}

impl<T> AddRequest<T> {
    pub fn new(account_id: impl Into<String>, entities: Vec<T>) -> Self {
        AddRequest {
            account_id: account_id.into(),
            entities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub id: i64,
    pub conversation_id: i64,
    #[serde(rename = "type")]
    pub message_type: i32,
    pub timestamp: i64,
    pub mime_type: String,
    pub data: String,
    pub read: bool,
    pub seen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_device: Option<i64>,
}

impl MessageBody {
    pub fn seal(message: &Message, codec: FieldCodec<'_>) -> Result<Self, EncryptionError> {
        Ok(MessageBody {
            id: message.id,
            conversation_id: message.conversation_id,
            message_type: message.message_type.code(),
            timestamp: message.timestamp,
            mime_type: codec.encrypt(&message.mime_type)?,
            data: codec.encrypt(&message.data)?,
            read: message.read,
            seen: message.seen,
            from: codec.encrypt_opt(message.from.as_deref())?,
            color: message.color,
            sent_device: message.sent_device_id,
        })
    }

    pub fn open(&self, codec: FieldCodec<'_>) -> Result<Message, BodyError> {
        let message_type = MessageType::from_code(self.message_type)
            .ok_or(BodyError::UnknownMessageType(self.message_type))?;
        Ok(Message {
            id: self.id,
            conversation_id: self.conversation_id,
            message_type,
            timestamp: self.timestamp,
            mime_type: codec.decrypt(&self.mime_type)?,
            data: codec.decrypt(&self.data)?,
            read: self.read,
            seen: self.seen,
            from: codec.decrypt_opt(self.from.as_deref())?,
            color: self.color,
            sent_device_id: self.sent_device,
        })
    }

    /// Like [`open`](Self::open), but text bodies and the sender label
    /// fall back to [`DECRYPTION_ERROR_MARKER`](crate::crypto::DECRYPTION_ERROR_MARKER).
    ///
    /// The mime type and media references stay strict: a wrong value there
    /// would corrupt the row rather than just its display.
    pub fn open_lenient(&self, codec: FieldCodec<'_>) -> Result<Message, BodyError> {
        let message_type = MessageType::from_code(self.message_type)
            .ok_or(BodyError::UnknownMessageType(self.message_type))?;
        let mime_type = codec.decrypt(&self.mime_type)?;
        let data = if is_text_mime(&mime_type) {
            codec.decrypt_display(&self.data)
        } else {
            codec.decrypt(&self.data)?
        };
        Ok(Message {
            id: self.id,
            conversation_id: self.conversation_id,
            message_type,
            timestamp: self.timestamp,
            mime_type,
            data,
            read: self.read,
            seen: self.seen,
            from: self
                .from
                .as_deref()
                .filter(|f| !f.is_empty())
                .map(|f| codec.decrypt_display(f)),
            color: self.color,
            sent_device_id: self.sent_device,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationBody {
    pub id: i64,
    pub title: String,
    pub phone_numbers: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub timestamp: i64,
    pub read: bool,
    pub pinned: bool,
    pub archived: bool,
    pub muted: bool,
    pub private_notifications: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ringtone: Option<String>,
    pub led_color: i32,
    pub color: i32,
    pub color_dark: i32,
    pub color_light: i32,
    pub color_accent: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_subscription_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl ConversationBody {
    pub fn seal(
        conversation: &Conversation,
        codec: FieldCodec<'_>,
    ) -> Result<Self, EncryptionError> {
        let colors = conversation.colors;
        Ok(ConversationBody {
            id: conversation.id,
            title: codec.encrypt(&conversation.title)?,
            phone_numbers: codec.encrypt(&conversation.phone_numbers)?,
            snippet: codec.encrypt_opt(conversation.snippet.as_deref())?,
            timestamp: conversation.timestamp,
            read: conversation.read,
            pinned: conversation.pinned,
            archived: conversation.archived,
            muted: conversation.muted,
            private_notifications: conversation.private_notifications,
            ringtone: codec.encrypt_opt(conversation.ringtone_uri.as_deref())?,
            led_color: conversation.led_color,
            color: colors.color,
            color_dark: colors.color_dark,
            color_light: colors.color_light,
            color_accent: colors.color_accent,
            sim_subscription_id: conversation.sim_subscription_id,
            image_uri: codec.encrypt_opt(conversation.image_uri.as_deref())?,
        })
    }

    /// Decrypts the body. `id_matcher` is recomputed locally, never trusted.
    pub fn open(&self, codec: FieldCodec<'_>) -> Result<Conversation, BodyError> {
        let title = codec.decrypt(&self.title)?;
        let snippet = codec.decrypt_opt(self.snippet.as_deref())?;
        self.open_with(codec, title, snippet)
    }

    /// Like [`open`](Self::open), but the title and snippet fall back to
    /// the decryption error marker instead of failing.
    pub fn open_lenient(&self, codec: FieldCodec<'_>) -> Result<Conversation, BodyError> {
        let title = codec.decrypt_display(&self.title);
        let snippet = self
            .snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| codec.decrypt_display(s));
        self.open_with(codec, title, snippet)
    }

    fn open_with(
        &self,
        codec: FieldCodec<'_>,
        title: String,
        snippet: Option<String>,
    ) -> Result<Conversation, BodyError> {
        let phone_numbers = codec.decrypt(&self.phone_numbers)?;
        Ok(Conversation {
            id: self.id,
            title,
            id_matcher: id_matcher(&phone_numbers),
            phone_numbers,
            snippet,
            timestamp: self.timestamp,
            read: self.read,
            pinned: self.pinned,
            archived: self.archived,
            muted: self.muted,
            private_notifications: self.private_notifications,
            ringtone_uri: codec.decrypt_opt(self.ringtone.as_deref())?,
            led_color: self.led_color,
            colors: ColorSet {
                color: self.color,
                color_dark: self.color_dark,
                color_light: self.color_light,
                color_accent: self.color_accent,
            },
            sim_subscription_id: self.sim_subscription_id,
            image_uri: codec.decrypt_opt(self.image_uri.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBody {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    pub color: i32,
    pub color_dark: i32,
    pub color_light: i32,
    pub color_accent: i32,
}

impl ContactBody {
    pub fn seal(contact: &Contact, codec: FieldCodec<'_>) -> Result<Self, EncryptionError> {
        Ok(ContactBody {
            id: contact.id,
            phone_number: codec.encrypt(&contact.phone_number)?,
            name: codec.encrypt(&contact.name)?,
            color: contact.colors.color,
            color_dark: contact.colors.color_dark,
            color_light: contact.colors.color_light,
            color_accent: contact.colors.color_accent,
        })
    }

    pub fn open(&self, codec: FieldCodec<'_>) -> Result<Contact, BodyError> {
        Ok(Contact {
            id: self.id,
            phone_number: codec.decrypt(&self.phone_number)?,
            name: codec.decrypt(&self.name)?,
            colors: ColorSet {
                color: self.color,
                color_dark: self.color_dark,
                color_light: self.color_light,
                color_accent: self.color_accent,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBody {
    pub id: i64,
    pub conversation_id: i64,
    pub data: String,
    pub mime_type: String,
}

impl DraftBody {
    pub fn seal(draft: &Draft, codec: FieldCodec<'_>) -> Result<Self, EncryptionError> {
        Ok(DraftBody {
            id: draft.id,
            conversation_id: draft.conversation_id,
            data: codec.encrypt(&draft.data)?,
            mime_type: codec.encrypt(&draft.mime_type)?,
        })
    }

    pub fn open(&self, codec: FieldCodec<'_>) -> Result<Draft, BodyError> {
        Ok(Draft {
            id: self.id,
            conversation_id: self.conversation_id,
            data: codec.decrypt(&self.data)?,
            mime_type: codec.decrypt(&self.mime_type)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistBody {
    pub id: i64,
    pub phone_number: String,
}

impl BlacklistBody {
    pub fn seal(blacklist: &Blacklist, codec: FieldCodec<'_>) -> Result<Self, EncryptionError> {
        Ok(BlacklistBody {
            id: blacklist.id,
            phone_number: codec.encrypt(&blacklist.phone_number)?,
        })
    }

    pub fn open(&self, codec: FieldCodec<'_>) -> Result<Blacklist, BodyError> {
        Ok(Blacklist {
            id: self.id,
            phone_number: codec.decrypt(&self.phone_number)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessageBody {
    pub id: i64,
    pub to: String,
    pub data: String,
    pub mime_type: String,
    pub timestamp: i64,
    pub title: String,
}

impl ScheduledMessageBody {
    pub fn seal(
        scheduled: &ScheduledMessage,
        codec: FieldCodec<'_>,
    ) -> Result<Self, EncryptionError> {
        Ok(ScheduledMessageBody {
            id: scheduled.id,
            to: codec.encrypt(&scheduled.to)?,
            data: codec.encrypt(&scheduled.data)?,
            mime_type: codec.encrypt(&scheduled.mime_type)?,
            timestamp: scheduled.timestamp,
            title: codec.encrypt(&scheduled.title)?,
        })
    }

    pub fn open(&self, codec: FieldCodec<'_>) -> Result<ScheduledMessage, BodyError> {
        Ok(ScheduledMessage {
            id: self.id,
            to: codec.decrypt(&self.to)?,
            data: codec.decrypt(&self.data)?,
            mime_type: codec.decrypt(&self.mime_type)?,
            timestamp: self.timestamp,
            title: codec.decrypt(&self.title)?,
        })
    }
}
