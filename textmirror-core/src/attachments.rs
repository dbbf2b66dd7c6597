// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Attachment Transfer
//!
//! Moves media bytes between the local media directory and the blob store,
//! addressed by `{account_id}/{message_id}`. Transfers run on a bounded
//! worker pool owned by [`AttachmentTransfer`], so a large attachment never
//! holds up row-level sync. A batch waits on a completion channel up to a
//! wall-clock deadline; when the deadline passes the batch is reported as
//! timed out, jobs that have not started are cancelled and the leftovers
//! are picked up again by the next full sync.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;

use crate::account::AccountContext;
use crate::config::SyncConfig;
use crate::crypto::{decrypt, encrypt, EncryptionError, SymmetricKey};
use crate::remote::{blob_path, BlobStore, TransportError};

/// Attachment transfer errors.
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("crypto error: {0}")]
    Crypto(#[from] EncryptionError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("message {0} has no local file")]
    NoLocalFile(i64),

    #[error("transfer pool is shut down")]
    PoolClosed,
}

/// A downloaded attachment written to the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub message_id: i64,
    pub path: PathBuf,
    /// Value written into the message's `data`.
    pub uri: String,
}

impl DownloadedFile {
    /// Deletes the file of an attachment whose message no longer exists.
    pub fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(
                message_id = self.message_id,
                path = %self.path.display(),
                error = %e,
                "could not remove orphaned attachment"
            );
        }
    }
}

/// A pending download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub message_id: i64,
    pub mime_type: String,
}

/// A pending upload of a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub message_id: i64,
    pub path: PathBuf,
}

/// Outcome of a transfer batch.
#[derive(Debug)]
pub struct TransferReport<T> {
    pub completed: Vec<T>,
    pub failed: Vec<(i64, AttachmentError)>,
    /// Jobs that were neither completed nor failed when the batch ended.
    pub unfinished: Vec<i64>,
    pub timed_out: bool,
}

impl<T> Default for TransferReport<T> {
    fn default() -> Self {
        TransferReport {
            completed: Vec::new(),
            failed: Vec::new(),
            unfinished: Vec::new(),
            timed_out: false,
        }
    }
}

impl<T> TransferReport<T> {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.unfinished.is_empty()
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct WorkerPool {
    sender: Mutex<Sender<Job>>,
    size: usize,
}

impl WorkerPool {
    fn new(size: usize) -> Result<Self, AttachmentError> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let size = size.max(1);
        for index in 0..size {
            let receiver = Arc::clone(&receiver);
            std::thread::Builder::new()
                .name(format!("textmirror-transfer-{}", index))
                .spawn(move || loop {
                    let next = receiver.lock().recv();
                    match next {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })?;
        }
        Ok(WorkerPool {
            sender: Mutex::new(sender),
            size,
        })
    }

    fn execute(&self, job: Job) -> Result<(), AttachmentError> {
        self.sender
            .lock()
            .send(job)
            .map_err(|_| AttachmentError::PoolClosed)
    }
}

/// Returns the file URI stored in a message's `data` for `path`.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Resolves a message's `data` to a local file path.
///
/// Accepts `file://` URIs and bare paths; anything else (placeholders,
/// remote URLs) has no local file.
pub fn local_path(data: &str) -> Option<PathBuf> {
    if let Some(rest) = data.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if data.starts_with('/') {
        return Some(PathBuf::from(data));
    }
    None
}

/// File extension for a mime type, `bin` when unknown.
fn extension_for(mime_type: &str) -> String {
    let subtype = mime_type
        .split(';')
        .next()
        .and_then(|m| m.split('/').nth(1))
        .map(str::trim)
        .unwrap_or("");
    match subtype {
        "jpeg" => "jpg".to_string(),
        s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => s.to_lowercase(),
        _ => "bin".to_string(),
    }
}

fn download_one(
    blobs: &dyn BlobStore,
    account_id: &str,
    key: &SymmetricKey,
    media_dir: &Path,
    job: &DownloadJob,
) -> Result<DownloadedFile, AttachmentError> {
    let ciphertext = blobs.get(&blob_path(account_id, job.message_id))?;
    let plaintext = decrypt(key, &ciphertext)?;

    fs::create_dir_all(media_dir)?;
    let path = media_dir.join(format!(
        "{}.{}",
        job.message_id,
        extension_for(&job.mime_type)
    ));
    fs::write(&path, plaintext)?;

    tracing::debug!(message_id = job.message_id, path = %path.display(), "attachment downloaded");
    Ok(DownloadedFile {
        message_id: job.message_id,
        uri: file_uri(&path),
        path,
    })
}

fn upload_one(
    blobs: &dyn BlobStore,
    account_id: &str,
    key: &SymmetricKey,
    job: &UploadJob,
) -> Result<i64, AttachmentError> {
    if !job.path.is_file() {
        return Err(AttachmentError::NoLocalFile(job.message_id));
    }
    let plaintext = fs::read(&job.path)?;
    let ciphertext = encrypt(key, &plaintext)?;
    blobs.put(&blob_path(account_id, job.message_id), &ciphertext)?;
    tracing::debug!(message_id = job.message_id, bytes = plaintext.len(), "attachment uploaded");
    Ok(job.message_id)
}

/// Downloads and uploads attachment bytes on a bounded worker pool.
pub struct AttachmentTransfer {
    blobs: Arc<dyn BlobStore>,
    media_dir: PathBuf,
    pool: WorkerPool,
}

impl AttachmentTransfer {
    pub fn new(blobs: Arc<dyn BlobStore>, config: &SyncConfig) -> Result<Self, AttachmentError> {
        Ok(AttachmentTransfer {
            blobs,
            media_dir: config.media_dir.clone(),
            pool: WorkerPool::new(config.transfer_workers)?,
        })
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    pub fn worker_count(&self) -> usize {
        self.pool.size
    }

    /// Downloads one attachment on the calling thread.
    pub fn download(
        &self,
        ctx: &AccountContext,
        job: &DownloadJob,
    ) -> Result<DownloadedFile, AttachmentError> {
        download_one(
            self.blobs.as_ref(),
            ctx.account_id(),
            ctx.key(),
            &self.media_dir,
            job,
        )
    }

    /// Uploads one attachment on the calling thread.
    pub fn upload(&self, ctx: &AccountContext, job: &UploadJob) -> Result<(), AttachmentError> {
        upload_one(self.blobs.as_ref(), ctx.account_id(), ctx.key(), job).map(|_| ())
    }

    /// Queues a download on the pool and runs `on_done` on the worker once
    /// it finishes.
    pub fn submit_download<F>(
        &self,
        ctx: &AccountContext,
        job: DownloadJob,
        on_done: F,
    ) -> Result<(), AttachmentError>
    where
        F: FnOnce(Result<DownloadedFile, AttachmentError>) + Send + 'static,
    {
        let blobs = Arc::clone(&self.blobs);
        let account_id = ctx.account_id().to_string();
        let key = ctx.key().clone();
        let media_dir = self.media_dir.clone();
        self.pool.execute(Box::new(move || {
            on_done(download_one(
                blobs.as_ref(),
                &account_id,
                &key,
                &media_dir,
                &job,
            ));
        }))
    }

    /// Downloads a batch, returning whatever finished before `timeout`.
    pub fn download_batch(
        &self,
        ctx: &AccountContext,
        jobs: Vec<DownloadJob>,
        timeout: Duration,
    ) -> TransferReport<DownloadedFile> {
        let tasks = jobs
            .into_iter()
            .map(|job| {
                let blobs = Arc::clone(&self.blobs);
                let account_id = ctx.account_id().to_string();
                let key = ctx.key().clone();
                let media_dir = self.media_dir.clone();
                let id = job.message_id;
                let task: Task<DownloadedFile> = Box::new(move || {
                    download_one(blobs.as_ref(), &account_id, &key, &media_dir, &job)
                });
                (id, task)
            })
            .collect();
        self.run_batch("download", tasks, timeout)
    }

    /// Uploads a batch, returning the ids stored before `timeout`.
    pub fn upload_batch(
        &self,
        ctx: &AccountContext,
        jobs: Vec<UploadJob>,
        timeout: Duration,
    ) -> TransferReport<i64> {
        let tasks = jobs
            .into_iter()
            .map(|job| {
                let blobs = Arc::clone(&self.blobs);
                let account_id = ctx.account_id().to_string();
                let key = ctx.key().clone();
                let id = job.message_id;
                let task: Task<i64> =
                    Box::new(move || upload_one(blobs.as_ref(), &account_id, &key, &job));
                (id, task)
            })
            .collect();
        self.run_batch("upload", tasks, timeout)
    }

    fn run_batch<T: Send + 'static>(
        &self,
        direction: &'static str,
        tasks: Vec<(i64, Task<T>)>,
        timeout: Duration,
    ) -> TransferReport<T> {
        let mut report = TransferReport::default();
        if tasks.is_empty() {
            return report;
        }

        let deadline = Instant::now() + timeout;
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx): (Sender<(i64, Result<T, AttachmentError>)>, Receiver<_>) = mpsc::channel();
        let mut pending = HashSet::new();

        for (id, task) in tasks {
            let tx = tx.clone();
            let cancelled = Arc::clone(&cancelled);
            let submitted = self.pool.execute(Box::new(move || {
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                // The batch may have given up already; a closed channel is fine.
                let _ = tx.send((id, task()));
            }));
            match submitted {
                Ok(()) => {
                    pending.insert(id);
                }
                Err(e) => report.failed.push((id, e)),
            }
        }
        drop(tx);

        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    match outcome {
                        Ok(value) => report.completed.push(value),
                        Err(e) => {
                            tracing::warn!(
                                direction,
                                message_id = id,
                                error = %e,
                                "attachment transfer failed"
                            );
                            report.failed.push((id, e));
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    report.timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if report.timed_out {
            cancelled.store(true, Ordering::SeqCst);
            tracing::warn!(
                direction,
                unfinished = pending.len(),
                "attachment batch hit its safety timeout"
            );
        }
        let mut unfinished: Vec<i64> = pending.into_iter().collect();
        unfinished.sort_unstable();
        report.unfinished = unfinished;

        tracing::info!(
            direction,
            completed = report.completed.len(),
            failed = report.failed.len(),
            unfinished = report.unfinished.len(),
            "attachment batch finished"
        );
        report
    }
}

type Task<T> = Box<dyn FnOnce() -> Result<T, AttachmentError> + Send + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_common_types() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("video/mp4; codecs=avc1"), "mp4");
        assert_eq!(extension_for("application/vnd.ms-excel"), "bin");
        assert_eq!(extension_for("garbage"), "bin");
    }

    #[test]
    fn test_local_path_from_data() {
        assert_eq!(local_path("file:///tmp/a.jpg"), Some(PathBuf::from("/tmp/a.jpg")));
        assert_eq!(local_path("/tmp/b.png"), Some(PathBuf::from("/tmp/b.png")));
        assert_eq!(local_path("firebase -1"), None);
    }
}
