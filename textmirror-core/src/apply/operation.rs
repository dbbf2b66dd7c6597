// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operation decoding.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::payloads::*;
use super::ApplyError;
use crate::remote::{
    BlacklistBody, ContactBody, ConversationBody, DraftBody, MessageBody, ScheduledMessageBody,
};

/// A push notification as delivered: an operation name plus its payload
/// serialized as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub operation: String,
    pub data: String,
}

impl Notification {
    pub fn new(operation: impl Into<String>, data: impl Into<String>) -> Self {
        Notification {
            operation: operation.into(),
            data: data.into(),
        }
    }

    /// Builds a notification from a payload value.
    pub fn with_payload<T: Serialize>(
        operation: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Notification {
            operation: operation.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// A decoded remote change.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddedMessage(MessageBody),
    UpdatedMessage(UpdatedMessage),
    UpdateMessageType(UpdateMessageType),
    RemovedMessage(EntityId),
    CleanupMessages(CleanupMessages),
    CleanupConversationMessages(CleanupConversationMessages),
    AddedConversation(ConversationBody),
    UpdatedConversation(UpdatedConversation),
    UpdateConversationTitle(UpdateConversationTitle),
    UpdateConversationSnippet(UpdateConversationSnippet),
    RemovedConversation(EntityId),
    ReadConversation(ReadConversation),
    SeenConversation(EntityId),
    ArchiveConversation(ArchiveConversation),
    SeenConversations,
    AddedContact(ContactBody),
    UpdatedContact(ContactBody),
    RemovedContact(RemovedContact),
    RemovedContactById(RemovedContactsById),
    AddedDraft(DraftBody),
    RemovedDrafts(RemovedDrafts),
    AddedBlacklist(BlacklistBody),
    RemovedBlacklist(EntityId),
    AddedScheduledMessage(ScheduledMessageBody),
    UpdatedScheduledMessage(ScheduledMessageBody),
    RemovedScheduledMessage(EntityId),
    UpdateSetting(UpdateSetting),
    UpdateSubscription(UpdateSubscription),
    UpdatePrimaryDevice(UpdatePrimaryDevice),
    FeatureFlag(FeatureFlag),
    DismissedNotification(DismissedNotification),
    ForwardToPhone(ForwardToPhone),
    RemovedAccount(AccountRef),
    UpdatedAccount(UpdatedAccount),
    CleanedAccount(AccountRef),
}

fn parse<T: DeserializeOwned>(operation: &str, data: &str) -> Result<T, ApplyError> {
    serde_json::from_str(data).map_err(|source| ApplyError::Malformed {
        operation: operation.to_string(),
        source,
    })
}

impl Operation {
    /// Decodes a notification into a typed operation.
    ///
    /// Unknown names yield [`ApplyError::UnknownOperation`]; payloads that
    /// do not match the operation yield [`ApplyError::Malformed`].
    pub fn decode(name: &str, data: &str) -> Result<Self, ApplyError> {
        let op = match name {
            "added_message" => Operation::AddedMessage(parse(name, data)?),
            "updated_message" => Operation::UpdatedMessage(parse(name, data)?),
            "update_message_type" => Operation::UpdateMessageType(parse(name, data)?),
            "removed_message" => Operation::RemovedMessage(parse(name, data)?),
            "cleanup_messages" => Operation::CleanupMessages(parse(name, data)?),
            "cleanup_conversation_messages" => {
                Operation::CleanupConversationMessages(parse(name, data)?)
            }
            "added_conversation" => Operation::AddedConversation(parse(name, data)?),
            "updated_conversation" => Operation::UpdatedConversation(parse(name, data)?),
            "update_conversation_title" => Operation::UpdateConversationTitle(parse(name, data)?),
            "update_conversation_snippet" => {
                Operation::UpdateConversationSnippet(parse(name, data)?)
            }
            "removed_conversation" => Operation::RemovedConversation(parse(name, data)?),
            "read_conversation" => Operation::ReadConversation(parse(name, data)?),
            "seen_conversation" => Operation::SeenConversation(parse(name, data)?),
            "archive_conversation" => Operation::ArchiveConversation(parse(name, data)?),
            "seen_conversations" => Operation::SeenConversations,
            "added_contact" => Operation::AddedContact(parse(name, data)?),
            "updated_contact" => Operation::UpdatedContact(parse(name, data)?),
            "removed_contact" => Operation::RemovedContact(parse(name, data)?),
            "removed_contact_by_id" => Operation::RemovedContactById(parse(name, data)?),
            "added_draft" => Operation::AddedDraft(parse(name, data)?),
            "removed_drafts" => Operation::RemovedDrafts(parse(name, data)?),
            "added_blacklist" => Operation::AddedBlacklist(parse(name, data)?),
            "removed_blacklist" => Operation::RemovedBlacklist(parse(name, data)?),
            "added_scheduled_message" => Operation::AddedScheduledMessage(parse(name, data)?),
            "updated_scheduled_message" => Operation::UpdatedScheduledMessage(parse(name, data)?),
            "removed_scheduled_message" => Operation::RemovedScheduledMessage(parse(name, data)?),
            "update_setting" => Operation::UpdateSetting(parse(name, data)?),
            "update_subscription" => Operation::UpdateSubscription(parse(name, data)?),
            "update_primary_device" => Operation::UpdatePrimaryDevice(parse(name, data)?),
            "feature_flag" => Operation::FeatureFlag(parse(name, data)?),
            "dismissed_notification" => Operation::DismissedNotification(parse(name, data)?),
            "forward_to_phone" => Operation::ForwardToPhone(parse(name, data)?),
            "removed_account" => Operation::RemovedAccount(parse(name, data)?),
            "updated_account" => Operation::UpdatedAccount(parse(name, data)?),
            "cleaned_account" => Operation::CleanedAccount(parse(name, data)?),
            other => return Err(ApplyError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddedMessage(_) => "added_message",
            Operation::UpdatedMessage(_) => "updated_message",
            Operation::UpdateMessageType(_) => "update_message_type",
            Operation::RemovedMessage(_) => "removed_message",
            Operation::CleanupMessages(_) => "cleanup_messages",
            Operation::CleanupConversationMessages(_) => "cleanup_conversation_messages",
            Operation::AddedConversation(_) => "added_conversation",
            Operation::UpdatedConversation(_) => "updated_conversation",
            Operation::UpdateConversationTitle(_) => "update_conversation_title",
            Operation::UpdateConversationSnippet(_) => "update_conversation_snippet",
            Operation::RemovedConversation(_) => "removed_conversation",
            Operation::ReadConversation(_) => "read_conversation",
            Operation::SeenConversation(_) => "seen_conversation",
            Operation::ArchiveConversation(_) => "archive_conversation",
            Operation::SeenConversations => "seen_conversations",
            Operation::AddedContact(_) => "added_contact",
            Operation::UpdatedContact(_) => "updated_contact",
            Operation::RemovedContact(_) => "removed_contact",
            Operation::RemovedContactById(_) => "removed_contact_by_id",
            Operation::AddedDraft(_) => "added_draft",
            Operation::RemovedDrafts(_) => "removed_drafts",
            Operation::AddedBlacklist(_) => "added_blacklist",
            Operation::RemovedBlacklist(_) => "removed_blacklist",
            Operation::AddedScheduledMessage(_) => "added_scheduled_message",
            Operation::UpdatedScheduledMessage(_) => "updated_scheduled_message",
            Operation::RemovedScheduledMessage(_) => "removed_scheduled_message",
            Operation::UpdateSetting(_) => "update_setting",
            Operation::UpdateSubscription(_) => "update_subscription",
            Operation::UpdatePrimaryDevice(_) => "update_primary_device",
            Operation::FeatureFlag(_) => "feature_flag",
            Operation::DismissedNotification(_) => "dismissed_notification",
            Operation::ForwardToPhone(_) => "forward_to_phone",
            Operation::RemovedAccount(_) => "removed_account",
            Operation::UpdatedAccount(_) => "updated_account",
            Operation::CleanedAccount(_) => "cleaned_account",
        }
    }
}

impl TryFrom<&Notification> for Operation {
    type Error = ApplyError;

    fn try_from(notification: &Notification) -> Result<Self, Self::Error> {
        Operation::decode(&notification.operation, &notification.data)
    }
}
