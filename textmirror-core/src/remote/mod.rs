// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote Collaborators
//!
//! Interfaces to everything outside the local store: the REST API holding
//! the encrypted copy of the account, the blob store for attachment bytes,
//! the platform contact directory and the outbound telephony sender.
//!
//! # Synchronous Interface
//!
//! All traits are blocking. Sync runs on dedicated threads; platform
//! implementations may use an async runtime internally.

pub mod bodies;
#[cfg(feature = "http")]
mod http;
mod mock;

pub use bodies::{
    AddRequest, BlacklistBody, BodyError, ContactBody, ConversationBody, DraftBody, MessageBody,
    ScheduledMessageBody,
};
#[cfg(feature = "http")]
pub use http::{HttpBlobStore, HttpRemote};
pub use mock::{MockBlobStore, MockContactDirectory, MockOutboundSender, MockRemote, RemoteCall};

use thiserror::Error;

/// Transport error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Entity collections exposed by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Messages,
    Conversations,
    Contacts,
    Blacklists,
    ScheduledMessages,
    Drafts,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Messages,
        EntityKind::Conversations,
        EntityKind::Contacts,
        EntityKind::Blacklists,
        EntityKind::ScheduledMessages,
        EntityKind::Drafts,
    ];

    /// Collection name used in URLs and logs.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Messages => "messages",
            EntityKind::Conversations => "conversations",
            EntityKind::Contacts => "contacts",
            EntityKind::Blacklists => "blacklists",
            EntityKind::ScheduledMessages => "scheduled_messages",
            EntityKind::Drafts => "drafts",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// The server of record: one list/add pair per entity collection.
///
/// `add_*` is an upsert by id on the server side, so repeating an upload is
/// harmless.
pub trait RemoteApi: Send + Sync {
    /// Fetches one page of messages, newest last.
    fn list_messages(
        &self,
        account_id: &str,
        limit: usize,
        offset: usize,
    ) -> TransportResult<Vec<MessageBody>>;

    /// Fetches the newest `limit` messages.
    fn list_recent_messages(
        &self,
        account_id: &str,
        limit: usize,
    ) -> TransportResult<Vec<MessageBody>>;

    fn list_conversations(&self, account_id: &str) -> TransportResult<Vec<ConversationBody>>;
    fn list_contacts(&self, account_id: &str) -> TransportResult<Vec<ContactBody>>;
    fn list_blacklists(&self, account_id: &str) -> TransportResult<Vec<BlacklistBody>>;
    fn list_scheduled_messages(
        &self,
        account_id: &str,
    ) -> TransportResult<Vec<ScheduledMessageBody>>;
    fn list_drafts(&self, account_id: &str) -> TransportResult<Vec<DraftBody>>;

    fn add_messages(&self, request: &AddRequest<MessageBody>) -> TransportResult<()>;
    fn add_conversations(&self, request: &AddRequest<ConversationBody>) -> TransportResult<()>;
    fn add_contacts(&self, request: &AddRequest<ContactBody>) -> TransportResult<()>;
    fn add_blacklists(&self, request: &AddRequest<BlacklistBody>) -> TransportResult<()>;
    fn add_scheduled_messages(
        &self,
        request: &AddRequest<ScheduledMessageBody>,
    ) -> TransportResult<()>;
    fn add_drafts(&self, request: &AddRequest<DraftBody>) -> TransportResult<()>;
}

/// Ciphertext-only storage for attachment bytes.
pub trait BlobStore: Send + Sync {
    fn get(&self, path: &str) -> TransportResult<Vec<u8>>;
    fn put(&self, path: &str, ciphertext: &[u8]) -> TransportResult<()>;
}

/// Address of a message's attachment in the blob store.
pub fn blob_path(account_id: &str, message_id: i64) -> String {
    format!("{}/{}", account_id, message_id)
}

/// Platform contact lookup used to hydrate conversation images.
pub trait ContactDirectory: Send + Sync {
    /// Returns the image URI for a participant list, `None` if unknown.
    fn resolve_image(&self, phone_numbers: &str) -> Option<String>;
}

/// Directory that never resolves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContactDirectory;

impl ContactDirectory for NoContactDirectory {
    fn resolve_image(&self, _phone_numbers: &str) -> Option<String> {
        None
    }
}

/// A message the primary device must actually send over telephony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Local message id when the send mirrors a stored row.
    pub message_id: Option<i64>,
    pub conversation_id: i64,
    pub phone_numbers: String,
    pub data: String,
    pub mime_type: String,
}

/// Telephony send plumbing. Only invoked on the primary device.
pub trait OutboundSender: Send + Sync {
    fn send(&self, message: &OutboundMessage) -> TransportResult<()>;
}
