// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bulk Sync
//!
//! Full-account transfers between the local store and the server, plus the
//! engine that owns them.

mod downloader;
mod engine;
mod uploader;

pub use downloader::{BulkDownloader, DownloadReport};
pub use engine::{BulkHandle, FeedbackLoop, FeedbackPause, SyncEngine};
pub use uploader::{BulkUploader, CollectionReport, MediaReport, UploadReport};
