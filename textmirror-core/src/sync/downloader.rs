// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bulk Downloader
//!
//! Replaces the local store with the server's copy of the account:
//!
//! 1. Pause the local-to-network feedback loop.
//! 2. Fetch every collection and decrypt it record by record. Messages are
//!    pulled in pages at `offset = records received so far` until an empty
//!    page, or until too many consecutive pages fail.
//! 3. In one transaction wipe the synced tables and insert everything.
//! 4. Resume the feedback loop.
//! 5. Download attachments for the newest pending media messages, outside
//!    the transaction.
//!
//! A collection whose fetch fails degrades to zero records; a record that
//! does not decrypt is skipped without touching its siblings.

use crate::account::AccountContext;
use crate::attachments::{AttachmentTransfer, DownloadJob};
use crate::config::SyncConfig;
use crate::crypto::FieldCodec;
use crate::error::SyncResult;
use crate::model::{Blacklist, Contact, Conversation, Draft, Message, ScheduledMessage};
use crate::pagination::PageCursor;
use crate::remote::{
    BodyError, ContactDirectory, ConversationBody, EntityKind, MessageBody, NoContactDirectory,
    RemoteApi, TransportResult,
};
use crate::storage::{Storage, StorageError};

use super::engine::FeedbackLoop;
use super::uploader::MediaReport;

/// Outcome of a full download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub messages: usize,
    pub conversations: usize,
    pub contacts: usize,
    pub blacklists: usize,
    pub scheduled_messages: usize,
    pub drafts: usize,
    /// Records dropped because they did not decrypt.
    pub skipped_records: usize,
    /// Message pages that failed to fetch.
    pub failed_pages: usize,
    /// Collections whose fetch failed outright.
    pub failed_collections: Vec<EntityKind>,
    pub media: Option<MediaReport>,
}

/// Decrypted records of one collection plus the count of skipped ones.
struct Fetched<T> {
    records: Vec<T>,
    skipped: usize,
}

impl<T> Fetched<T> {
    fn empty() -> Self {
        Fetched {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

fn open_all<B, T>(
    kind: EntityKind,
    bodies: &[B],
    codec: FieldCodec<'_>,
    open: impl Fn(&B, FieldCodec<'_>) -> Result<T, BodyError>,
) -> Fetched<T> {
    let mut fetched = Fetched {
        records: Vec::with_capacity(bodies.len()),
        skipped: 0,
    };
    for body in bodies {
        match open(body, codec) {
            Ok(record) => fetched.records.push(record),
            Err(e) => {
                tracing::warn!(collection = %kind, error = %e, "skipping undecryptable record");
                fetched.skipped += 1;
            }
        }
    }
    fetched
}

/// Everything fetched from the remote, ready to be written.
struct Snapshot {
    messages: Vec<Message>,
    conversations: Vec<Conversation>,
    contacts: Vec<Contact>,
    blacklists: Vec<Blacklist>,
    scheduled: Vec<ScheduledMessage>,
    drafts: Vec<Draft>,
}

/// Pulls the remote copy of an account into the local store.
pub struct BulkDownloader<'a> {
    storage: &'a Storage,
    remote: &'a dyn RemoteApi,
    directory: &'a dyn ContactDirectory,
    attachments: Option<&'a AttachmentTransfer>,
    feedback: Option<&'a FeedbackLoop>,
    config: &'a SyncConfig,
}

impl<'a> BulkDownloader<'a> {
    pub fn new(storage: &'a Storage, remote: &'a dyn RemoteApi, config: &'a SyncConfig) -> Self {
        BulkDownloader {
            storage,
            remote,
            directory: &NoContactDirectory,
            attachments: None,
            feedback: None,
            config,
        }
    }

    /// Resolve conversation images through `directory`.
    pub fn with_directory(mut self, directory: &'a dyn ContactDirectory) -> Self {
        self.directory = directory;
        self
    }

    /// Download pending media after the rows are committed.
    pub fn with_attachments(mut self, attachments: &'a AttachmentTransfer) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Pause `feedback` while the store is being replaced.
    pub fn with_feedback(mut self, feedback: &'a FeedbackLoop) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn download(&self, ctx: &AccountContext) -> SyncResult<DownloadReport> {
        let mut report = DownloadReport::default();

        {
            let _paused = self.feedback.map(FeedbackLoop::pause);

            let snapshot = self.fetch_snapshot(ctx, &mut report);
            self.storage.transaction(|s| {
                s.wipe_entities()?;
                for conversation in &snapshot.conversations {
                    if !s.insert_conversation(conversation)? {
                        tracing::debug!(
                            conversation_id = conversation.id,
                            "conversation collides with an existing group key"
                        );
                    }
                }
                report.conversations = s.count_conversations()?;
                report.messages = s.insert_messages(&snapshot.messages)?;
                for contact in &snapshot.contacts {
                    s.upsert_contact(contact)?;
                }
                report.contacts = snapshot.contacts.len();
                for blacklist in &snapshot.blacklists {
                    if s.insert_blacklist(blacklist)? {
                        report.blacklists += 1;
                    }
                }
                for scheduled in &snapshot.scheduled {
                    if s.insert_scheduled(scheduled)? {
                        report.scheduled_messages += 1;
                    }
                }
                for draft in &snapshot.drafts {
                    if s.insert_draft(draft)? {
                        report.drafts += 1;
                    }
                }
                Ok::<_, StorageError>(())
            })?;
        }

        tracing::info!(
            messages = report.messages,
            conversations = report.conversations,
            skipped = report.skipped_records,
            failed_pages = report.failed_pages,
            "bulk download committed"
        );

        if let Some(attachments) = self.attachments {
            report.media = Some(self.download_media(ctx, attachments)?);
        }
        Ok(report)
    }

    fn fetch_snapshot(&self, ctx: &AccountContext, report: &mut DownloadReport) -> Snapshot {
        let codec = ctx.codec();
        let account_id = ctx.account_id();

        let messages = self.fetch_messages(ctx, report);
        let mut conversations = self.fetch_conversations(ctx, report);
        for conversation in &mut conversations {
            conversation.image_uri = self.directory.resolve_image(&conversation.phone_numbers);
        }

        let contacts = self.fetch_collection(
            EntityKind::Contacts,
            self.remote.list_contacts(account_id),
            codec,
            |b, c| b.open(c),
            report,
        );
        let blacklists = self.fetch_collection(
            EntityKind::Blacklists,
            self.remote.list_blacklists(account_id),
            codec,
            |b, c| b.open(c),
            report,
        );
        let scheduled = self.fetch_collection(
            EntityKind::ScheduledMessages,
            self.remote.list_scheduled_messages(account_id),
            codec,
            |b, c| b.open(c),
            report,
        );
        let drafts = self.fetch_collection(
            EntityKind::Drafts,
            self.remote.list_drafts(account_id),
            codec,
            |b, c| b.open(c),
            report,
        );

        Snapshot {
            messages,
            conversations,
            contacts,
            blacklists,
            scheduled,
            drafts,
        }
    }

    fn fetch_messages(&self, ctx: &AccountContext, report: &mut DownloadReport) -> Vec<Message> {
        let codec = ctx.codec();
        let mut cursor = PageCursor::new(self.config.message_page_size);
        let mut messages = Vec::new();
        let mut consecutive_failures = 0;

        loop {
            match self
                .remote
                .list_messages(ctx.account_id(), cursor.page_size(), cursor.offset())
            {
                Ok(page) if page.is_empty() => break,
                Ok(page) => {
                    consecutive_failures = 0;
                    cursor.advance(page.len());
                    let fetched = open_all(EntityKind::Messages, &page, codec, MessageBody::open);
                    report.skipped_records += fetched.skipped;
                    messages.extend(fetched.records);
                }
                Err(e) => {
                    consecutive_failures += 1;
                    report.failed_pages += 1;
                    tracing::warn!(
                        offset = cursor.offset(),
                        attempt = consecutive_failures,
                        error = %e,
                        "message page fetch failed"
                    );
                    if consecutive_failures >= self.config.max_failed_pages {
                        tracing::error!(offset = cursor.offset(), "giving up on message pages");
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            pages = cursor.pages_fetched(),
            received = cursor.offset(),
            decrypted = messages.len(),
            "messages fetched"
        );
        messages
    }

    /// Fetches conversations, retrying the whole fetch when a transport
    /// error or a decryption failure occurs. On the last attempt bad
    /// records are skipped individually.
    fn fetch_conversations(
        &self,
        ctx: &AccountContext,
        report: &mut DownloadReport,
    ) -> Vec<Conversation> {
        let codec = ctx.codec();
        let retries = self.config.conversation_retries;

        for attempt in 0..=retries {
            let last_attempt = attempt == retries;
            match self.remote.list_conversations(ctx.account_id()) {
                Ok(bodies) => {
                    let fetched =
                        open_all(EntityKind::Conversations, &bodies, codec, ConversationBody::open);
                    if fetched.skipped > 0 && !last_attempt {
                        tracing::warn!(
                            skipped = fetched.skipped,
                            attempt,
                            "conversation decryption failed, retrying fetch"
                        );
                        continue;
                    }
                    report.skipped_records += fetched.skipped;
                    return fetched.records;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "conversation fetch failed");
                }
            }
        }

        report.failed_collections.push(EntityKind::Conversations);
        Vec::new()
    }

    fn fetch_collection<B, T>(
        &self,
        kind: EntityKind,
        result: TransportResult<Vec<B>>,
        codec: FieldCodec<'_>,
        open: impl Fn(&B, FieldCodec<'_>) -> Result<T, BodyError>,
        report: &mut DownloadReport,
    ) -> Vec<T> {
        let fetched = match result {
            Ok(bodies) => open_all(kind, &bodies, codec, open),
            Err(e) => {
                tracing::warn!(collection = %kind, error = %e, "collection fetch failed");
                report.failed_collections.push(kind);
                Fetched::empty()
            }
        };
        report.skipped_records += fetched.skipped;
        fetched.records
    }

    /// Fetches bytes for the newest pending media and points each message
    /// at its local file.
    fn download_media(
        &self,
        ctx: &AccountContext,
        attachments: &AttachmentTransfer,
    ) -> SyncResult<MediaReport> {
        let pending = self
            .storage
            .read(|s| s.pending_media_messages(self.config.max_media_downloads))?;
        let jobs = pending
            .into_iter()
            .map(|m| DownloadJob {
                message_id: m.id,
                mime_type: m.mime_type,
            })
            .collect();

        let outcome = attachments.download_batch(ctx, jobs, self.config.media_download_timeout);
        let orphaned = self.storage.transaction(|s| {
            let mut orphaned = Vec::new();
            for file in &outcome.completed {
                if !s.update_message_data(file.message_id, &file.uri)? {
                    orphaned.push(file);
                }
            }
            Ok::<_, StorageError>(orphaned)
        })?;
        for file in &orphaned {
            file.discard();
        }

        Ok(MediaReport {
            transferred: outcome.completed.len() - orphaned.len(),
            failed: outcome.failed.len(),
            unfinished: outcome.unfinished.len(),
            timed_out: outcome.timed_out,
        })
    }
}
