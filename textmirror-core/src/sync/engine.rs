// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Engine
//!
//! Owns the collaborators of one account and serializes bulk transfers:
//! at most one bulk download or upload runs per engine, and the running
//! state is an atomic anyone can query.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::account::AccountContext;
use crate::apply::ChangeApplier;
use crate::attachments::AttachmentTransfer;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::events::{EventDispatcher, SyncEvent};
use crate::remote::{ContactDirectory, NoContactDirectory, OutboundSender, RemoteApi};
use crate::storage::Storage;

use super::downloader::{BulkDownloader, DownloadReport};
use super::uploader::{BulkUploader, UploadReport};

const IDLE: u8 = 0;
const DOWNLOADING: u8 = 1;
const UPLOADING: u8 = 2;

/// Gate between local store changes and the network.
///
/// While paused, changes written to the store (for example by a bulk
/// download) must not be forwarded back to the server.
#[derive(Debug, Default)]
pub struct FeedbackLoop {
    pauses: AtomicUsize,
}

impl FeedbackLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses forwarding until the returned guard is dropped. Pauses nest.
    pub fn pause(&self) -> FeedbackPause<'_> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("feedback loop paused");
        FeedbackPause { feedback: self }
    }

    pub fn is_paused(&self) -> bool {
        self.pauses.load(Ordering::SeqCst) > 0
    }
}

/// Resumes the feedback loop on drop.
#[must_use = "the feedback loop resumes as soon as the guard is dropped"]
pub struct FeedbackPause<'a> {
    feedback: &'a FeedbackLoop,
}

impl Drop for FeedbackPause<'_> {
    fn drop(&mut self) {
        self.feedback.pauses.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("feedback loop resumed");
    }
}

/// Clears the bulk state on drop, including on panic.
struct BulkGuard<'a>(&'a AtomicU8);

impl Drop for BulkGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::SeqCst);
    }
}

/// A bulk transfer running on its own thread.
pub struct BulkHandle<T> {
    handle: JoinHandle<SyncResult<T>>,
}

impl<T> BulkHandle<T> {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the transfer finishes.
    pub fn join(self) -> SyncResult<T> {
        self.handle
            .join()
            .map_err(|_| SyncError::Thread("bulk sync thread panicked".into()))?
    }
}

/// Entry point for one account's sync.
pub struct SyncEngine {
    storage: Arc<Storage>,
    remote: Arc<dyn RemoteApi>,
    directory: Arc<dyn ContactDirectory>,
    attachments: Option<Arc<AttachmentTransfer>>,
    sender: Option<Arc<dyn OutboundSender>>,
    config: SyncConfig,
    events: EventDispatcher,
    feedback: FeedbackLoop,
    bulk: AtomicU8,
}

impl SyncEngine {
    pub fn new(storage: Arc<Storage>, remote: Arc<dyn RemoteApi>, config: SyncConfig) -> Self {
        SyncEngine {
            storage,
            remote,
            directory: Arc::new(NoContactDirectory),
            attachments: None,
            sender: None,
            config,
            events: EventDispatcher::new(),
            feedback: FeedbackLoop::new(),
            bulk: AtomicU8::new(IDLE),
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn ContactDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_attachments(mut self, attachments: Arc<AttachmentTransfer>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn with_sender(mut self, sender: Arc<dyn OutboundSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn is_bulk_download_running(&self) -> bool {
        self.bulk.load(Ordering::SeqCst) == DOWNLOADING
    }

    pub fn is_bulk_upload_running(&self) -> bool {
        self.bulk.load(Ordering::SeqCst) == UPLOADING
    }

    /// Whether local edits should be pushed to the server right now.
    pub fn should_forward_local_changes(&self) -> bool {
        !self.feedback.is_paused()
    }

    /// A change applier sharing this engine's store and collaborators.
    pub fn applier(&self) -> ChangeApplier {
        let mut applier =
            ChangeApplier::new(Arc::clone(&self.storage)).with_events(self.events.clone());
        if let Some(attachments) = &self.attachments {
            applier = applier.with_attachments(Arc::clone(attachments));
        }
        if let Some(sender) = &self.sender {
            applier = applier.with_sender(Arc::clone(sender));
        }
        applier
    }

    fn claim(&self, state: u8) -> SyncResult<()> {
        self.bulk
            .compare_exchange(IDLE, state, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| SyncError::AlreadyRunning)
    }

    /// Replaces the local store with the server copy on the calling thread.
    pub fn run_bulk_download(&self, ctx: &AccountContext) -> SyncResult<DownloadReport> {
        self.claim(DOWNLOADING)?;
        let _guard = BulkGuard(&self.bulk);
        self.download(ctx)
    }

    /// Pushes the local store to the server on the calling thread.
    pub fn run_bulk_upload(&self, ctx: &AccountContext) -> SyncResult<UploadReport> {
        self.claim(UPLOADING)?;
        let _guard = BulkGuard(&self.bulk);
        self.upload(ctx)
    }

    /// Starts a bulk download on a dedicated thread.
    ///
    /// The running flag is set before this returns, so a caller that checks
    /// [`is_bulk_download_running`](Self::is_bulk_download_running) right
    /// after sees the download.
    pub fn spawn_bulk_download(
        self: &Arc<Self>,
        ctx: AccountContext,
    ) -> SyncResult<BulkHandle<DownloadReport>> {
        self.claim(DOWNLOADING)?;
        let engine = Arc::clone(self);
        self.spawn("textmirror-download", move || {
            let _guard = BulkGuard(&engine.bulk);
            engine.download(&ctx)
        })
    }

    /// Starts a bulk upload on a dedicated thread.
    pub fn spawn_bulk_upload(
        self: &Arc<Self>,
        ctx: AccountContext,
    ) -> SyncResult<BulkHandle<UploadReport>> {
        self.claim(UPLOADING)?;
        let engine = Arc::clone(self);
        self.spawn("textmirror-upload", move || {
            let _guard = BulkGuard(&engine.bulk);
            engine.upload(&ctx)
        })
    }

    fn spawn<T, F>(&self, name: &str, task: F) -> SyncResult<BulkHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> SyncResult<T> + Send + 'static,
    {
        match thread::Builder::new().name(name.to_string()).spawn(task) {
            Ok(handle) => Ok(BulkHandle { handle }),
            Err(e) => {
                self.bulk.store(IDLE, Ordering::SeqCst);
                Err(SyncError::Thread(e.to_string()))
            }
        }
    }

    fn download(&self, ctx: &AccountContext) -> SyncResult<DownloadReport> {
        tracing::info!(account_id = ctx.account_id(), "bulk download started");
        let mut downloader = BulkDownloader::new(&self.storage, self.remote.as_ref(), &self.config)
            .with_directory(self.directory.as_ref())
            .with_feedback(&self.feedback);
        if let Some(attachments) = &self.attachments {
            downloader = downloader.with_attachments(attachments);
        }
        let report = downloader.download(ctx)?;
        tracing::info!(
            messages = report.messages,
            conversations = report.conversations,
            skipped = report.skipped_records,
            "bulk download finished"
        );
        self.events.dispatch(SyncEvent::BulkDownloadFinished {
            messages: report.messages,
            conversations: report.conversations,
        });
        Ok(report)
    }

    fn upload(&self, ctx: &AccountContext) -> SyncResult<UploadReport> {
        tracing::info!(account_id = ctx.account_id(), "bulk upload started");
        let mut uploader = BulkUploader::new(&self.storage, self.remote.as_ref(), &self.config);
        if let Some(attachments) = &self.attachments {
            uploader = uploader.with_attachments(attachments);
        }
        uploader.upload(ctx)
    }

    /// Applies recent server messages this device never heard about.
    ///
    /// Returns the number of messages stored. Does nothing while a bulk
    /// download is running, since that download replaces the store anyway.
    pub fn check_missed_messages(&self, ctx: &AccountContext) -> SyncResult<usize> {
        if self.is_bulk_download_running() {
            tracing::debug!("bulk download running, skipping missed message check");
            return Ok(0);
        }
        let bodies = self
            .remote
            .list_recent_messages(ctx.account_id(), self.config.message_page_size.get())?;
        let applier = self.applier();
        let codec = ctx.codec();
        let mut stored = 0;
        for body in bodies {
            if self.storage.get_message(body.id)?.is_some() {
                continue;
            }
            let message = match body.open_lenient(codec) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(message_id = body.id, error = %e, "skipping unreadable message");
                    continue;
                }
            };
            match applier.apply_message(ctx, message) {
                Ok(outcome) if outcome.is_applied() => stored += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(message_id = body.id, error = %e, "missed message not applied")
                }
            }
        }
        if stored > 0 {
            tracing::info!(stored, "recovered missed messages");
        }
        Ok(stored)
    }
}
