// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Upload Command
//!
//! Pushes the local store to the server of record.

use std::sync::Arc;

use anyhow::{bail, Result};

use super::open_engine;
use crate::config::CliConfig;

pub fn run(config: &CliConfig) -> Result<()> {
    let storage = config.open_storage()?;
    let ctx = config.account_context(&storage)?;
    let engine = Arc::new(open_engine(config, storage)?);

    let report = engine.spawn_bulk_upload(ctx)?.join()?;

    println!("Uploaded:");
    for (kind, collection) in &report.collections {
        println!(
            "  {:<20} {} records in {} pages",
            kind.to_string(),
            collection.records,
            collection.pages
        );
        if collection.failed_pages > 0 || collection.skipped > 0 {
            println!(
                "  {:<20} {} failed pages, {} skipped records",
                "",
                collection.failed_pages,
                collection.skipped
            );
        }
    }
    if let Some(media) = &report.media {
        println!(
            "Media: {} transferred, {} failed, {} unfinished",
            media.transferred, media.failed, media.unfinished
        );
    }

    if !report.is_success() {
        bail!("upload finished with failures; run it again to retry");
    }
    Ok(())
}
