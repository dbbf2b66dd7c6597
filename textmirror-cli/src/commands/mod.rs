// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Commands

pub mod apply;
pub mod download;
pub mod status;
pub mod upload;

use std::sync::Arc;

use anyhow::{Context, Result};
use textmirror_core::{AttachmentTransfer, HttpBlobStore, HttpRemote, Storage, SyncEngine};

use crate::config::CliConfig;

/// Wires an engine against the HTTP API.
fn open_engine(config: &CliConfig, storage: Arc<Storage>) -> Result<SyncEngine> {
    let api = config.api_config();
    let sync = config.sync_config();
    let remote = HttpRemote::new(&api).context("building API client")?;
    let blobs = HttpBlobStore::new(&api).context("building media client")?;
    let attachments = AttachmentTransfer::new(Arc::new(blobs), &sync)
        .context("preparing media directory")?;

    Ok(SyncEngine::new(storage, Arc::new(remote), sync).with_attachments(Arc::new(attachments)))
}
