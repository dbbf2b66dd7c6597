// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change applier: one guarded mutation per operation.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::operation::{Notification, Operation};
use super::payloads::ForwardToPhone;
use super::ApplyError;
use crate::account::AccountContext;
use crate::attachments::{AttachmentTransfer, DownloadJob, DownloadedFile};
use crate::events::{EventDispatcher, SyncEvent};
use crate::model::{
    is_placeholder, ColorSet, Conversation, Message, MessageType, Subscription, SubscriptionType,
    MIME_TEXT_PLAIN,
};
use crate::remote::{MessageBody, OutboundMessage, OutboundSender};
use crate::storage::{ConversationUpdate, MessageUpdate, Session, Storage, StorageError};

/// Two messages with the same content and direction closer together than
/// this are treated as one delivered twice.
const DUPLICATE_WINDOW_MS: i64 = 60_000;

/// Why an operation left the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The entity is already present.
    Duplicate,
    /// The targeted row does not exist.
    Absent,
    /// The operation originated on this device.
    OwnDevice,
    /// Only the primary device acts on this operation.
    NotPrimary,
    /// The operation targets another account.
    OtherAccount,
}

/// Result of applying one operation.
#[derive(Debug)]
pub enum ApplyOutcome {
    Applied,
    NoOp(NoOpReason),
    /// The operation name is unknown to this client.
    Ignored,
    /// The message row is stored; its attachment is still downloading.
    PendingMedia(PendingMedia),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied | ApplyOutcome::PendingMedia(_))
    }
}

/// Completion handle for a deferred attachment download.
#[derive(Debug)]
pub struct PendingMedia {
    message_id: i64,
    receiver: Receiver<Result<DownloadedFile, ApplyError>>,
}

impl PendingMedia {
    pub fn message_id(&self) -> i64 {
        self.message_id
    }

    /// Waits up to `timeout` for the download to finish.
    ///
    /// Returns `None` on timeout or when the result was already taken.
    pub fn wait(&self, timeout: Duration) -> Option<Result<DownloadedFile, ApplyError>> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn changed(changed: bool) -> ApplyOutcome {
    if changed {
        ApplyOutcome::Applied
    } else {
        ApplyOutcome::NoOp(NoOpReason::Absent)
    }
}

fn inserted(inserted: bool) -> ApplyOutcome {
    if inserted {
        ApplyOutcome::Applied
    } else {
        ApplyOutcome::NoOp(NoOpReason::Duplicate)
    }
}

fn message_type(code: i32) -> Result<MessageType, ApplyError> {
    MessageType::from_code(code)
        .ok_or_else(|| ApplyError::InvalidPayload(format!("unknown message type {}", code)))
}

/// True if `incoming` repeats `latest` under a different id.
///
/// Placeholders are never compared: two pending attachments look identical
/// until their bytes arrive.
fn is_content_duplicate(latest: &Message, incoming: &Message) -> bool {
    !is_placeholder(&incoming.data)
        && latest.data == incoming.data
        && latest.mime_type == incoming.mime_type
        && latest.message_type.is_outgoing() == incoming.message_type.is_outgoing()
        && (latest.timestamp - incoming.timestamp).abs() <= DUPLICATE_WINDOW_MS
}

/// Updates the conversation list projection for a newly stored message.
fn hydrate_conversation(s: &Session<'_>, message: &Message) -> Result<(), StorageError> {
    let Some(conversation) = s.get_conversation(message.conversation_id)? else {
        tracing::debug!(
            message_id = message.id,
            conversation_id = message.conversation_id,
            "conversation absent, message stored without hydration"
        );
        return Ok(());
    };
    if message.timestamp < conversation.timestamp {
        return Ok(());
    }
    let snippet = if message.is_media() {
        &message.mime_type
    } else {
        &message.data
    };
    s.update_conversation_snippet(conversation.id, snippet, message.timestamp)?;
    if !message.message_type.is_outgoing() && !message.read {
        s.update_conversation(
            conversation.id,
            &ConversationUpdate {
                read: Some(false),
                ..Default::default()
            },
        )?;
    }
    Ok(())
}

/// Applies decoded remote operations to the local store.
///
/// Safe to call from several threads at once: each operation runs in its
/// own transaction and every insert is a compare-and-insert.
pub struct ChangeApplier {
    storage: Arc<Storage>,
    attachments: Option<Arc<AttachmentTransfer>>,
    sender: Option<Arc<dyn OutboundSender>>,
    events: EventDispatcher,
}

impl ChangeApplier {
    pub fn new(storage: Arc<Storage>) -> Self {
        ChangeApplier {
            storage,
            attachments: None,
            sender: None,
            events: EventDispatcher::new(),
        }
    }

    /// Download pending media of applied messages on `attachments`.
    pub fn with_attachments(mut self, attachments: Arc<AttachmentTransfer>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Perform real sends through `sender` when this device is primary.
    pub fn with_sender(mut self, sender: Arc<dyn OutboundSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Decodes and applies a raw notification.
    ///
    /// Unknown operations are logged and reported as [`ApplyOutcome::Ignored`].
    pub fn apply_notification(
        &self,
        ctx: &AccountContext,
        notification: &Notification,
    ) -> Result<ApplyOutcome, ApplyError> {
        match Operation::try_from(notification) {
            Ok(op) => self.apply(ctx, op),
            Err(ApplyError::UnknownOperation(name)) => {
                tracing::warn!(operation = %name, "ignoring unknown operation");
                Ok(ApplyOutcome::Ignored)
            }
            Err(e) => {
                tracing::warn!(
                    operation = %notification.operation,
                    error = %e,
                    "malformed notification"
                );
                Err(e)
            }
        }
    }

    /// Applies one decoded operation.
    pub fn apply(&self, ctx: &AccountContext, op: Operation) -> Result<ApplyOutcome, ApplyError> {
        let name = op.name();
        let result = self.dispatch(ctx, op);
        match &result {
            Ok(outcome) => tracing::debug!(operation = name, ?outcome, "operation applied"),
            Err(e) => tracing::warn!(operation = name, error = %e, "operation aborted"),
        }
        result
    }

    /// Inserts a message fetched outside a notification, with the same
    /// duplicate policy as `added_message`.
    pub fn apply_message(
        &self,
        ctx: &AccountContext,
        message: Message,
    ) -> Result<ApplyOutcome, ApplyError> {
        self.insert_message(ctx, message)
    }

    fn dispatch(&self, ctx: &AccountContext, op: Operation) -> Result<ApplyOutcome, ApplyError> {
        let codec = ctx.codec();
        match op {
            // === Messages ===
            Operation::AddedMessage(body) => self.added_message(ctx, &body),
            Operation::UpdatedMessage(p) => {
                let update = MessageUpdate {
                    message_type: p.message_type.map(message_type).transpose()?,
                    timestamp: p.timestamp,
                    read: p.read,
                    seen: p.seen,
                };
                self.update_message(p.id, &update)
            }
            Operation::UpdateMessageType(p) => {
                let update = MessageUpdate {
                    message_type: Some(message_type(p.message_type)?),
                    ..Default::default()
                };
                self.update_message(p.id, &update)
            }
            Operation::RemovedMessage(p) => {
                let removed = self.storage.transaction(|s| s.delete_message(p.id))?;
                Ok(changed(removed))
            }
            Operation::CleanupMessages(p) => {
                let removed = self
                    .storage
                    .transaction(|s| s.delete_messages_before(p.timestamp))?;
                tracing::info!(removed, before = p.timestamp, "cleaned up messages");
                Ok(ApplyOutcome::Applied)
            }
            Operation::CleanupConversationMessages(p) => {
                let removed = self.storage.transaction(|s| {
                    s.delete_conversation_messages_before(p.conversation_id, p.timestamp)
                })?;
                tracing::info!(
                    removed,
                    conversation_id = p.conversation_id,
                    "cleaned up conversation messages"
                );
                Ok(ApplyOutcome::Applied)
            }

            // === Conversations ===
            Operation::AddedConversation(body) => {
                let conversation = body.open_lenient(codec)?;
                let outcome = self.storage.transaction(|s| {
                    if s.get_conversation(conversation.id)?.is_some()
                        || s
                            .find_conversation_by_phone_numbers(&conversation.phone_numbers)?
                            .is_some()
                    {
                        return Ok::<_, StorageError>(false);
                    }
                    s.insert_conversation(&conversation)
                })?;
                if outcome {
                    self.events.dispatch(SyncEvent::ConversationChanged {
                        conversation_id: conversation.id,
                    });
                }
                Ok(inserted(outcome))
            }
            Operation::UpdatedConversation(p) => {
                let colors = match (p.color, p.color_dark, p.color_light, p.color_accent) {
                    (Some(color), Some(color_dark), Some(color_light), Some(color_accent)) => {
                        Some(ColorSet {
                            color,
                            color_dark,
                            color_light,
                            color_accent,
                        })
                    }
                    _ => None,
                };
                let update = ConversationUpdate {
                    read: p.read,
                    pinned: p.pinned,
                    archived: p.archived,
                    muted: p.muted,
                    private_notifications: p.private_notifications,
                    ringtone_uri: codec.decrypt_opt(p.ringtone.as_deref())?,
                    led_color: p.led_color,
                    colors,
                    sim_subscription_id: p.sim_subscription_id,
                    ..Default::default()
                };
                self.update_conversation(p.id, &update)
            }
            Operation::UpdateConversationTitle(p) => {
                let update = ConversationUpdate {
                    title: Some(codec.decrypt_display(&p.title)),
                    ..Default::default()
                };
                self.update_conversation(p.id, &update)
            }
            Operation::UpdateConversationSnippet(p) => {
                let snippet = codec.decrypt_display(&p.snippet);
                let updated = self.storage.transaction(|s| {
                    s.update_conversation_snippet(p.id, &snippet, p.timestamp)
                })?;
                Ok(changed(updated))
            }
            Operation::RemovedConversation(p) => {
                let removed = self.storage.transaction(|s| s.delete_conversation(p.id))?;
                if removed {
                    self.events
                        .dispatch(SyncEvent::ConversationChanged { conversation_id: p.id });
                }
                Ok(changed(removed))
            }
            Operation::ReadConversation(p) => {
                if ctx.is_own_device(p.device_id) {
                    return Ok(ApplyOutcome::NoOp(NoOpReason::OwnDevice));
                }
                let updated = self.storage.transaction(|s| {
                    let conversation = s.update_conversation(
                        p.id,
                        &ConversationUpdate {
                            read: Some(true),
                            ..Default::default()
                        },
                    )?;
                    let messages = s.mark_conversation_messages_read(p.id)?;
                    Ok::<_, StorageError>(conversation || messages > 0)
                })?;
                if updated {
                    self.events
                        .dispatch(SyncEvent::ConversationRead { conversation_id: p.id });
                }
                Ok(changed(updated))
            }
            Operation::SeenConversation(p) => {
                self.storage
                    .transaction(|s| s.mark_conversation_messages_seen(p.id))?;
                Ok(ApplyOutcome::Applied)
            }
            Operation::ArchiveConversation(p) => {
                let update = ConversationUpdate {
                    archived: Some(p.archive),
                    ..Default::default()
                };
                self.update_conversation(p.id, &update)
            }
            Operation::SeenConversations => {
                self.storage.transaction(|s| s.mark_all_messages_seen())?;
                Ok(ApplyOutcome::Applied)
            }

            // === Contacts ===
            Operation::AddedContact(body) | Operation::UpdatedContact(body) => {
                let contact = body.open(codec)?;
                self.storage.transaction(|s| s.upsert_contact(&contact))?;
                Ok(ApplyOutcome::Applied)
            }
            Operation::RemovedContact(p) => {
                let phone_number = codec.decrypt(&p.phone_number)?;
                let removed = self
                    .storage
                    .transaction(|s| s.delete_contact(&phone_number))?;
                Ok(changed(removed))
            }
            Operation::RemovedContactById(p) => {
                let removed = self
                    .storage
                    .transaction(|s| s.delete_contacts_by_ids(&p.ids))?;
                Ok(changed(removed > 0))
            }

            // === Drafts ===
            Operation::AddedDraft(body) => {
                let draft = body.open(codec)?;
                Ok(inserted(self.storage.transaction(|s| s.insert_draft(&draft))?))
            }
            Operation::RemovedDrafts(p) => {
                if ctx.is_own_device(p.device_id) {
                    return Ok(ApplyOutcome::NoOp(NoOpReason::OwnDevice));
                }
                let removed = self
                    .storage
                    .transaction(|s| s.delete_drafts_for_conversation(p.id))?;
                Ok(changed(removed > 0))
            }

            // === Blacklists ===
            Operation::AddedBlacklist(body) => {
                let blacklist = body.open(codec)?;
                Ok(inserted(
                    self.storage.transaction(|s| s.insert_blacklist(&blacklist))?,
                ))
            }
            Operation::RemovedBlacklist(p) => {
                Ok(changed(self.storage.transaction(|s| s.delete_blacklist(p.id))?))
            }

            // === Scheduled messages ===
            Operation::AddedScheduledMessage(body) => {
                let scheduled = body.open(codec)?;
                Ok(inserted(
                    self.storage.transaction(|s| s.insert_scheduled(&scheduled))?,
                ))
            }
            Operation::UpdatedScheduledMessage(body) => {
                let scheduled = body.open(codec)?;
                Ok(changed(
                    self.storage.transaction(|s| s.update_scheduled(&scheduled))?,
                ))
            }
            Operation::RemovedScheduledMessage(p) => {
                Ok(changed(self.storage.transaction(|s| s.delete_scheduled(p.id))?))
            }

            // === Account ===
            Operation::UpdateSetting(p) => {
                let value = p.setting_value()?;
                self.storage.transaction(|s| s.put_setting(&p.pref, &value))?;
                self.events.dispatch(SyncEvent::SettingUpdated {
                    key: p.pref,
                    value,
                });
                Ok(ApplyOutcome::Applied)
            }
            Operation::UpdateSubscription(p) => {
                let subscription = Subscription {
                    kind: SubscriptionType::from_code(p.subscription_type),
                    expiration: p.expiration.unwrap_or(0),
                };
                self.storage
                    .transaction(|s| s.set_subscription(subscription))?;
                Ok(ApplyOutcome::Applied)
            }
            Operation::UpdatePrimaryDevice(p) => {
                let is_primary = p.new_primary_device_id == ctx.device_id();
                self.storage.transaction(|s| s.set_primary(is_primary))?;
                tracing::info!(is_primary, "primary device changed");
                self.events
                    .dispatch(SyncEvent::PrimaryDeviceChanged { is_primary });
                Ok(ApplyOutcome::Applied)
            }
            Operation::FeatureFlag(p) => {
                self.storage
                    .transaction(|s| s.set_feature_flag(&p.identifier, p.value))?;
                Ok(ApplyOutcome::Applied)
            }
            Operation::DismissedNotification(p) => {
                if ctx.is_own_device(p.device_id) {
                    return Ok(ApplyOutcome::NoOp(NoOpReason::OwnDevice));
                }
                self.events
                    .dispatch(SyncEvent::NotificationDismissed { conversation_id: p.id });
                Ok(ApplyOutcome::Applied)
            }
            Operation::ForwardToPhone(p) => self.forward_to_phone(ctx, &p),
            Operation::RemovedAccount(p) => {
                if p.account_id != ctx.account_id() {
                    return Ok(ApplyOutcome::NoOp(NoOpReason::OtherAccount));
                }
                self.storage.transaction(|s| s.wipe_account())?;
                tracing::info!("account removed remotely, local data wiped");
                self.events.dispatch(SyncEvent::AccountRemoved);
                Ok(ApplyOutcome::Applied)
            }
            Operation::CleanedAccount(p) => {
                if p.account_id != ctx.account_id() {
                    return Ok(ApplyOutcome::NoOp(NoOpReason::OtherAccount));
                }
                self.storage.transaction(|s| s.wipe_entities())?;
                tracing::info!("account cleaned remotely, synced data wiped");
                Ok(ApplyOutcome::Applied)
            }
            Operation::UpdatedAccount(p) => {
                let real_name = p.real_name.as_deref().map(|n| codec.decrypt_display(n));
                let phone_number = codec.decrypt_opt(p.phone_number.as_deref())?;
                self.storage.transaction(|s| {
                    s.set_profile(real_name.as_deref(), phone_number.as_deref())
                })?;
                Ok(ApplyOutcome::Applied)
            }
        }
    }

    fn update_message(&self, id: i64, update: &MessageUpdate) -> Result<ApplyOutcome, ApplyError> {
        let conversation_id = self.storage.transaction(|s| {
            if s.update_message(id, update)? {
                Ok::<_, StorageError>(s.get_message(id)?.map(|m| m.conversation_id))
            } else {
                Ok(None)
            }
        })?;
        match conversation_id {
            Some(conversation_id) => {
                self.events.dispatch(SyncEvent::MessageChanged {
                    conversation_id,
                    message_id: id,
                });
                Ok(ApplyOutcome::Applied)
            }
            None => Ok(ApplyOutcome::NoOp(NoOpReason::Absent)),
        }
    }

    fn update_conversation(
        &self,
        id: i64,
        update: &ConversationUpdate,
    ) -> Result<ApplyOutcome, ApplyError> {
        let updated = self
            .storage
            .transaction(|s| s.update_conversation(id, update))?;
        if updated {
            self.events
                .dispatch(SyncEvent::ConversationChanged { conversation_id: id });
        }
        Ok(changed(updated))
    }

    fn added_message(
        &self,
        ctx: &AccountContext,
        body: &MessageBody,
    ) -> Result<ApplyOutcome, ApplyError> {
        let message = body.open_lenient(ctx.codec())?;
        self.insert_message(ctx, message)
    }

    fn insert_message(
        &self,
        ctx: &AccountContext,
        mut message: Message,
    ) -> Result<ApplyOutcome, ApplyError> {
        // Only the primary device can put a message on the wire; everywhere
        // else a sending message is final.
        if message.message_type == MessageType::Sending && !ctx.is_primary() {
            message.message_type = MessageType::Sent;
        }

        let stored = self.storage.transaction(|s| {
            if s.get_message(message.id)?.is_some() {
                return Ok::<_, StorageError>(false);
            }
            if let Some(latest) = s.latest_message(message.conversation_id)? {
                if is_content_duplicate(&latest, &message) {
                    tracing::debug!(
                        message_id = message.id,
                        existing_id = latest.id,
                        "dropping duplicate message content"
                    );
                    return Ok(false);
                }
            }
            if !s.insert_message(&message)? {
                return Ok(false);
            }
            hydrate_conversation(s, &message)?;
            Ok(true)
        })?;
        if !stored {
            return Ok(ApplyOutcome::NoOp(NoOpReason::Duplicate));
        }

        if message.message_type == MessageType::Sending && ctx.is_primary() {
            let phone_numbers = self
                .storage
                .read(|s| s.get_conversation(message.conversation_id))?
                .map(|c| c.phone_numbers);
            match phone_numbers {
                Some(phone_numbers) => self.send_outbound(&message, phone_numbers),
                None => tracing::warn!(
                    message_id = message.id,
                    "cannot send message without a conversation"
                ),
            }
        }

        self.events.dispatch(SyncEvent::MessageChanged {
            conversation_id: message.conversation_id,
            message_id: message.id,
        });

        if message.is_pending_media() {
            if let Some(attachments) = &self.attachments {
                return self
                    .schedule_media(ctx, attachments, &message)
                    .map(ApplyOutcome::PendingMedia);
            }
        }
        Ok(ApplyOutcome::Applied)
    }

    /// Starts the attachment download for a provisional media row. On
    /// completion the row's `data` points at the local file and
    /// [`SyncEvent::MessageAvailable`] fires.
    fn schedule_media(
        &self,
        ctx: &AccountContext,
        attachments: &AttachmentTransfer,
        message: &Message,
    ) -> Result<PendingMedia, ApplyError> {
        let (tx, rx) = mpsc::channel();
        let storage = Arc::clone(&self.storage);
        let events = self.events.clone();
        let message_id = message.id;
        let conversation_id = message.conversation_id;

        let job = DownloadJob {
            message_id,
            mime_type: message.mime_type.clone(),
        };
        attachments.submit_download(ctx, job, move |result| {
            let outcome = result.map_err(ApplyError::from).and_then(|file| {
                if storage.transaction(|s| s.update_message_data(message_id, &file.uri))? {
                    Ok(file)
                } else {
                    file.discard();
                    Err(ApplyError::MessageRemoved(message_id))
                }
            });
            match &outcome {
                Ok(_) => events.dispatch(SyncEvent::MessageAvailable {
                    conversation_id,
                    message_id,
                }),
                Err(e) => {
                    tracing::warn!(message_id, error = %e, "deferred attachment download failed")
                }
            }
            // Nobody may be waiting on the handle.
            let _ = tx.send(outcome);
        })?;

        Ok(PendingMedia {
            message_id,
            receiver: rx,
        })
    }

    fn forward_to_phone(
        &self,
        ctx: &AccountContext,
        p: &ForwardToPhone,
    ) -> Result<ApplyOutcome, ApplyError> {
        if !ctx.is_primary() {
            return Ok(ApplyOutcome::NoOp(NoOpReason::NotPrimary));
        }
        let codec = ctx.codec();
        let to = codec.decrypt(&p.to)?;
        let data = codec.decrypt(&p.message)?;
        let mime_type = codec
            .decrypt_opt(p.mime_type.as_deref())?
            .unwrap_or_else(|| MIME_TEXT_PLAIN.to_string());
        let now = now_millis();
        let conversation_id = crate::crypto::random_id()?;
        let message_id = crate::crypto::random_id()?;

        let message = self.storage.transaction(|s| {
            let conversation = match s.find_conversation_by_phone_numbers(&to)? {
                Some(existing) => existing,
                None => {
                    let created = Conversation::new(conversation_id, to.clone(), now);
                    s.insert_conversation(&created)?;
                    created
                }
            };
            let message = Message {
                id: message_id,
                conversation_id: conversation.id,
                message_type: MessageType::Sending,
                timestamp: now,
                mime_type: mime_type.clone(),
                data: data.clone(),
                read: true,
                seen: true,
                from: None,
                color: None,
                sent_device_id: Some(ctx.device_id()),
            };
            s.insert_message(&message)?;
            hydrate_conversation(s, &message)?;
            Ok::<_, StorageError>(message)
        })?;

        self.send_outbound(&message, to);
        self.events.dispatch(SyncEvent::MessageChanged {
            conversation_id: message.conversation_id,
            message_id: message.id,
        });
        Ok(ApplyOutcome::Applied)
    }

    fn send_outbound(&self, message: &Message, phone_numbers: String) {
        let Some(sender) = &self.sender else {
            tracing::warn!(message_id = message.id, "no outbound sender configured");
            return;
        };
        let outbound = OutboundMessage {
            message_id: Some(message.id),
            conversation_id: message.conversation_id,
            phone_numbers,
            data: message.data.clone(),
            mime_type: message.mime_type.clone(),
        };
        if let Err(e) = sender.send(&outbound) {
            tracing::warn!(message_id = message.id, error = %e, "outbound send failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, data: &str, timestamp: i64) -> Message {
        Message {
            id,
            conversation_id: 1,
            message_type: MessageType::Received,
            timestamp,
            mime_type: MIME_TEXT_PLAIN.into(),
            data: data.into(),
            read: false,
            seen: false,
            from: None,
            color: None,
            sent_device_id: None,
        }
    }

    #[test]
    fn test_content_duplicate_within_window() {
        let latest = message(1, "hello", 1_000);
        assert!(is_content_duplicate(&latest, &message(2, "hello", 30_000)));
        assert!(!is_content_duplicate(&latest, &message(2, "hello", 120_000)));
        assert!(!is_content_duplicate(&latest, &message(2, "other", 1_000)));
    }

    #[test]
    fn test_placeholders_never_duplicate() {
        let mut latest = message(1, "firebase -1", 1_000);
        latest.mime_type = "image/jpeg".into();
        let mut incoming = latest.clone();
        incoming.id = 2;
        assert!(!is_content_duplicate(&latest, &incoming));
    }
}
