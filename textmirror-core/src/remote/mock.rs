// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-process collaborators for tests and offline use.
//!
//! `MockRemote` behaves like the server of record (upsert by id, offset
//! paging) and records every call so tests can assert on the request
//! sequence. Failures are injected per collection.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;

use super::{
    AddRequest, BlacklistBody, BlobStore, ContactBody, ContactDirectory, ConversationBody,
    DraftBody, EntityKind, MessageBody, OutboundMessage, OutboundSender, RemoteApi,
    ScheduledMessageBody, TransportError, TransportResult,
};

/// A call observed by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    ListMessages { limit: usize, offset: usize },
    ListRecentMessages { limit: usize },
    List(EntityKind),
    Add { kind: EntityKind, count: usize },
}

#[derive(Default)]
struct RemoteState {
    messages: Vec<MessageBody>,
    conversations: Vec<ConversationBody>,
    contacts: Vec<ContactBody>,
    blacklists: Vec<BlacklistBody>,
    scheduled: Vec<ScheduledMessageBody>,
    drafts: Vec<DraftBody>,
    calls: Vec<RemoteCall>,
    failing_lists: HashSet<EntityKind>,
    failing_message_offsets: HashSet<usize>,
    failing_adds: HashMap<EntityKind, usize>,
}

impl RemoteState {
    fn check_list(&self, kind: EntityKind) -> TransportResult<()> {
        if self.failing_lists.contains(&kind) {
            return Err(TransportError::Network(format!("injected {} list failure", kind)));
        }
        Ok(())
    }

    fn check_add(&mut self, kind: EntityKind) -> TransportResult<()> {
        if let Some(remaining) = self.failing_adds.get_mut(&kind) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TransportError::Http {
                    status: 503,
                    message: format!("injected {} add failure", kind),
                });
            }
        }
        Ok(())
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, incoming: &[T], id: impl Fn(&T) -> i64) {
    for item in incoming {
        match items.iter_mut().find(|existing| id(existing) == id(item)) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
    }
}

/// In-memory remote API.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<RemoteState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_messages(&self, bodies: impl IntoIterator<Item = MessageBody>) {
        self.state.lock().messages.extend(bodies);
    }

    pub fn seed_conversations(&self, bodies: impl IntoIterator<Item = ConversationBody>) {
        self.state.lock().conversations.extend(bodies);
    }

    pub fn seed_contacts(&self, bodies: impl IntoIterator<Item = ContactBody>) {
        self.state.lock().contacts.extend(bodies);
    }

    pub fn seed_blacklists(&self, bodies: impl IntoIterator<Item = BlacklistBody>) {
        self.state.lock().blacklists.extend(bodies);
    }

    pub fn seed_scheduled_messages(&self, bodies: impl IntoIterator<Item = ScheduledMessageBody>) {
        self.state.lock().scheduled.extend(bodies);
    }

    pub fn seed_drafts(&self, bodies: impl IntoIterator<Item = DraftBody>) {
        self.state.lock().drafts.extend(bodies);
    }

    /// Makes every list of `kind` fail with a network error.
    pub fn fail_list(&self, kind: EntityKind) {
        self.state.lock().failing_lists.insert(kind);
    }

    /// Makes the message page starting at `offset` fail.
    pub fn fail_message_page(&self, offset: usize) {
        self.state.lock().failing_message_offsets.insert(offset);
    }

    /// Makes the next `times` uploads of `kind` fail.
    pub fn fail_adds(&self, kind: EntityKind, times: usize) {
        self.state.lock().failing_adds.insert(kind, times);
    }

    /// Returns the calls observed so far, oldest first.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the `(limit, offset)` of every paged message fetch.
    pub fn message_fetches(&self) -> Vec<(usize, usize)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                RemoteCall::ListMessages { limit, offset } => Some((*limit, *offset)),
                _ => None,
            })
            .collect()
    }

    /// Counts list calls for a non-message collection.
    pub fn list_count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| **call == RemoteCall::List(kind))
            .count()
    }

    pub fn stored_messages(&self) -> Vec<MessageBody> {
        self.state.lock().messages.clone()
    }

    pub fn stored_conversations(&self) -> Vec<ConversationBody> {
        self.state.lock().conversations.clone()
    }

    pub fn stored_contacts(&self) -> Vec<ContactBody> {
        self.state.lock().contacts.clone()
    }

    pub fn stored_drafts(&self) -> Vec<DraftBody> {
        self.state.lock().drafts.clone()
    }
}

impl RemoteApi for MockRemote {
    fn list_messages(
        &self,
        _account_id: &str,
        limit: usize,
        offset: usize,
    ) -> TransportResult<Vec<MessageBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::ListMessages { limit, offset });
        state.check_list(EntityKind::Messages)?;
        if state.failing_message_offsets.contains(&offset) {
            return Err(TransportError::Network(format!(
                "injected failure at offset {}",
                offset
            )));
        }
        Ok(state
            .messages
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn list_recent_messages(
        &self,
        _account_id: &str,
        limit: usize,
    ) -> TransportResult<Vec<MessageBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::ListRecentMessages { limit });
        state.check_list(EntityKind::Messages)?;
        let mut recent = state.messages.clone();
        recent.sort_by_key(|m| std::cmp::Reverse(m.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }

    fn list_conversations(&self, _account_id: &str) -> TransportResult<Vec<ConversationBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::List(EntityKind::Conversations));
        state.check_list(EntityKind::Conversations)?;
        Ok(state.conversations.clone())
    }

    fn list_contacts(&self, _account_id: &str) -> TransportResult<Vec<ContactBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::List(EntityKind::Contacts));
        state.check_list(EntityKind::Contacts)?;
        Ok(state.contacts.clone())
    }

    fn list_blacklists(&self, _account_id: &str) -> TransportResult<Vec<BlacklistBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::List(EntityKind::Blacklists));
        state.check_list(EntityKind::Blacklists)?;
        Ok(state.blacklists.clone())
    }

    fn list_scheduled_messages(
        &self,
        _account_id: &str,
    ) -> TransportResult<Vec<ScheduledMessageBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::List(EntityKind::ScheduledMessages));
        state.check_list(EntityKind::ScheduledMessages)?;
        Ok(state.scheduled.clone())
    }

    fn list_drafts(&self, _account_id: &str) -> TransportResult<Vec<DraftBody>> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::List(EntityKind::Drafts));
        state.check_list(EntityKind::Drafts)?;
        Ok(state.drafts.clone())
    }

    fn add_messages(&self, request: &AddRequest<MessageBody>) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::Messages,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::Messages)?;
        upsert(&mut state.messages, &request.entities, |b| b.id);
        Ok(())
    }

    fn add_conversations(&self, request: &AddRequest<ConversationBody>) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::Conversations,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::Conversations)?;
        upsert(&mut state.conversations, &request.entities, |b| b.id);
        Ok(())
    }

    fn add_contacts(&self, request: &AddRequest<ContactBody>) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::Contacts,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::Contacts)?;
        upsert(&mut state.contacts, &request.entities, |b| b.id);
        Ok(())
    }

    fn add_blacklists(&self, request: &AddRequest<BlacklistBody>) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::Blacklists,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::Blacklists)?;
        upsert(&mut state.blacklists, &request.entities, |b| b.id);
        Ok(())
    }

    fn add_scheduled_messages(
        &self,
        request: &AddRequest<ScheduledMessageBody>,
    ) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::ScheduledMessages,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::ScheduledMessages)?;
        upsert(&mut state.scheduled, &request.entities, |b| b.id);
        Ok(())
    }

    fn add_drafts(&self, request: &AddRequest<DraftBody>) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::Add {
            kind: EntityKind::Drafts,
            count: request.entities.len(),
        });
        state.check_add(EntityKind::Drafts)?;
        upsert(&mut state.drafts, &request.entities, |b| b.id);
        Ok(())
    }
}

/// In-memory blob store with optional artificial latency.
#[derive(Default)]
pub struct MockBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    latency: Mutex<Option<Duration>>,
    gets: Mutex<Vec<String>>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every `get` and `put` by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn insert(&self, path: impl Into<String>, ciphertext: Vec<u8>) {
        self.blobs.lock().insert(path.into(), ciphertext);
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Paths requested through `get`, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.gets.lock().clone()
    }

    fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }
    }
}

impl BlobStore for MockBlobStore {
    fn get(&self, path: &str) -> TransportResult<Vec<u8>> {
        self.gets.lock().push(path.to_string());
        self.simulate_latency();
        self.blobs
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }

    fn put(&self, path: &str, ciphertext: &[u8]) -> TransportResult<()> {
        self.simulate_latency();
        self.blobs
            .lock()
            .insert(path.to_string(), ciphertext.to_vec());
        Ok(())
    }
}

/// Contact directory backed by a map from participant list to image URI.
#[derive(Default)]
pub struct MockContactDirectory {
    images: HashMap<String, String>,
}

impl MockContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, phone_numbers: &str, image_uri: &str) -> Self {
        self.images
            .insert(phone_numbers.to_string(), image_uri.to_string());
        self
    }
}

impl ContactDirectory for MockContactDirectory {
    fn resolve_image(&self, phone_numbers: &str) -> Option<String> {
        self.images.get(phone_numbers).cloned()
    }
}

/// Records outbound sends instead of performing them.
#[derive(Default)]
pub struct MockOutboundSender {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MockOutboundSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }
}

impl OutboundSender for MockOutboundSender {
    fn send(&self, message: &OutboundMessage) -> TransportResult<()> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
