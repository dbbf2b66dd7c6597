// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bulk Uploader
//!
//! Pushes the whole local store to the server of record. Rows are sealed
//! with the account key, messages go out in pages, every other collection
//! in one batch. A failed page is logged and counted; the rest of the
//! upload continues. Media bytes follow through [`AttachmentTransfer`].

use crate::account::AccountContext;
use crate::attachments::{local_path, AttachmentTransfer, UploadJob};
use crate::config::SyncConfig;
use crate::crypto::{EncryptionError, FieldCodec};
use crate::error::SyncResult;
use crate::model::{Message, PENDING_MEDIA_DATA};
use crate::pagination::paginate;
use crate::remote::{
    AddRequest, BlacklistBody, ContactBody, ConversationBody, DraftBody, EntityKind, MessageBody,
    RemoteApi, ScheduledMessageBody, TransportResult,
};
use crate::storage::{Storage, StorageError};

/// Per-collection upload result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Records sealed and sent.
    pub records: usize,
    /// Records that could not be sealed.
    pub skipped: usize,
    pub pages: usize,
    pub failed_pages: usize,
}

impl CollectionReport {
    pub fn is_success(&self) -> bool {
        self.failed_pages == 0 && self.skipped == 0
    }
}

/// Attachment part of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaReport {
    pub transferred: usize,
    pub failed: usize,
    pub unfinished: usize,
    pub timed_out: bool,
}

/// Outcome of a full upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub collections: Vec<(EntityKind, CollectionReport)>,
    pub media: Option<MediaReport>,
}

impl UploadReport {
    /// False if any page of any collection failed.
    pub fn is_success(&self) -> bool {
        self.collections.iter().all(|(_, r)| r.is_success())
    }

    pub fn collection(&self, kind: EntityKind) -> Option<&CollectionReport> {
        self.collections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r)
    }
}

/// Seals every item, skipping (and counting) the ones that fail.
fn seal_all<T, B>(
    kind: EntityKind,
    items: &[T],
    codec: FieldCodec<'_>,
    seal: impl Fn(&T, FieldCodec<'_>) -> Result<B, EncryptionError>,
) -> (Vec<B>, usize) {
    let mut sealed = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match seal(item, codec) {
            Ok(body) => sealed.push(body),
            Err(e) => {
                tracing::warn!(collection = %kind, error = %e, "failed to seal record");
                skipped += 1;
            }
        }
    }
    (sealed, skipped)
}

/// Sends one collection as a single request, retrying `retries` times.
fn push_batch<B>(
    kind: EntityKind,
    account_id: &str,
    (bodies, skipped): (Vec<B>, usize),
    retries: usize,
    send: impl Fn(&AddRequest<B>) -> TransportResult<()>,
) -> CollectionReport {
    let mut report = CollectionReport {
        skipped,
        ..Default::default()
    };
    if bodies.is_empty() {
        return report;
    }

    let count = bodies.len();
    let request = AddRequest::new(account_id, bodies);
    report.pages = 1;
    for attempt in 0..=retries {
        match send(&request) {
            Ok(()) => {
                report.records = count;
                return report;
            }
            Err(e) => {
                tracing::warn!(collection = %kind, attempt, error = %e, "batch upload failed");
            }
        }
    }
    report.failed_pages = 1;
    report
}

/// Walks the local store and pushes it to the remote API.
pub struct BulkUploader<'a> {
    storage: &'a Storage,
    remote: &'a dyn RemoteApi,
    attachments: Option<&'a AttachmentTransfer>,
    config: &'a SyncConfig,
}

impl<'a> BulkUploader<'a> {
    pub fn new(storage: &'a Storage, remote: &'a dyn RemoteApi, config: &'a SyncConfig) -> Self {
        BulkUploader {
            storage,
            remote,
            attachments: None,
            config,
        }
    }

    /// Also upload media bytes after the rows.
    pub fn with_attachments(mut self, attachments: &'a AttachmentTransfer) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Uploads every collection. Transport failures never abort the run;
    /// they show up in the returned report.
    pub fn upload(&self, ctx: &AccountContext) -> SyncResult<UploadReport> {
        let codec = ctx.codec();
        let account_id = ctx.account_id();
        let mut report = UploadReport::default();

        let (messages, conversations, contacts, blacklists, scheduled, drafts) =
            self.storage.read(|s| {
                Ok::<_, StorageError>((
                    s.list_messages()?,
                    s.list_conversations()?,
                    s.list_contacts()?,
                    s.list_blacklists()?,
                    s.list_scheduled()?,
                    s.list_drafts()?,
                ))
            })?;

        // Media bytes travel through the blob store; the row only carries
        // the placeholder.
        let message_count = messages.len();
        let outgoing: Vec<Message> = messages
            .into_iter()
            .map(|mut m| {
                if m.is_media() {
                    m.data = PENDING_MEDIA_DATA.to_string();
                }
                m
            })
            .collect();
        let (bodies, skipped) = seal_all(EntityKind::Messages, &outgoing, codec, MessageBody::seal);
        let mut messages_report = CollectionReport {
            skipped,
            ..Default::default()
        };
        for (page_index, page) in paginate(&bodies, self.config.message_page_size)
            .into_iter()
            .enumerate()
        {
            let count = page.len();
            messages_report.pages += 1;
            match self.remote.add_messages(&AddRequest::new(account_id, page)) {
                Ok(()) => messages_report.records += count,
                Err(e) => {
                    tracing::warn!(page = page_index, error = %e, "message page upload failed");
                    messages_report.failed_pages += 1;
                }
            }
        }
        report.collections.push((EntityKind::Messages, messages_report));

        let sealed = seal_all(
            EntityKind::Conversations,
            &conversations,
            codec,
            ConversationBody::seal,
        );
        let retries = self.config.conversation_retries;
        report.collections.push((
            EntityKind::Conversations,
            push_batch(EntityKind::Conversations, account_id, sealed, retries, |r| {
                self.remote.add_conversations(r)
            }),
        ));

        let sealed = seal_all(EntityKind::Contacts, &contacts, codec, ContactBody::seal);
        report.collections.push((
            EntityKind::Contacts,
            push_batch(EntityKind::Contacts, account_id, sealed, 0, |r| {
                self.remote.add_contacts(r)
            }),
        ));

        let sealed = seal_all(EntityKind::Blacklists, &blacklists, codec, BlacklistBody::seal);
        report.collections.push((
            EntityKind::Blacklists,
            push_batch(EntityKind::Blacklists, account_id, sealed, 0, |r| {
                self.remote.add_blacklists(r)
            }),
        ));

        let sealed = seal_all(
            EntityKind::ScheduledMessages,
            &scheduled,
            codec,
            ScheduledMessageBody::seal,
        );
        report.collections.push((
            EntityKind::ScheduledMessages,
            push_batch(EntityKind::ScheduledMessages, account_id, sealed, 0, |r| {
                self.remote.add_scheduled_messages(r)
            }),
        ));

        let sealed = seal_all(EntityKind::Drafts, &drafts, codec, DraftBody::seal);
        report.collections.push((
            EntityKind::Drafts,
            push_batch(EntityKind::Drafts, account_id, sealed, 0, |r| {
                self.remote.add_drafts(r)
            }),
        ));

        if let Some(attachments) = self.attachments {
            report.media = Some(self.upload_media(ctx, attachments)?);
        }

        tracing::info!(
            success = report.is_success(),
            messages = message_count,
            conversations = conversations.len(),
            "bulk upload finished"
        );
        Ok(report)
    }

    fn upload_media(
        &self,
        ctx: &AccountContext,
        attachments: &AttachmentTransfer,
    ) -> SyncResult<MediaReport> {
        let candidates = self
            .storage
            .read(|s| s.local_media_messages(self.config.max_media_uploads))?;
        let jobs: Vec<UploadJob> = candidates
            .into_iter()
            .filter_map(|m| {
                local_path(&m.data).map(|path| UploadJob {
                    message_id: m.id,
                    path,
                })
            })
            .collect();

        let outcome = attachments.upload_batch(ctx, jobs, self.config.media_upload_timeout);
        Ok(MediaReport {
            transferred: outcome.completed.len(),
            failed: outcome.failed.len(),
            unfinished: outcome.unfinished.len(),
            timed_out: outcome.timed_out,
        })
    }
}
