// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Download Command
//!
//! Replaces the local store with the server copy.

use std::sync::Arc;

use anyhow::Result;
use textmirror_core::DownloadReport;

use super::open_engine;
use crate::config::CliConfig;

pub fn run(config: &CliConfig) -> Result<()> {
    let storage = config.open_storage()?;
    let ctx = config.account_context(&storage)?;
    let engine = Arc::new(open_engine(config, storage)?);

    let report = engine.spawn_bulk_download(ctx)?.join()?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &DownloadReport) {
    println!("Downloaded:");
    println!("  messages:           {}", report.messages);
    println!("  conversations:      {}", report.conversations);
    println!("  contacts:           {}", report.contacts);
    println!("  blacklists:         {}", report.blacklists);
    println!("  scheduled messages: {}", report.scheduled_messages);
    println!("  drafts:             {}", report.drafts);
    if report.skipped_records > 0 {
        println!("  skipped (undecryptable): {}", report.skipped_records);
    }
    if report.failed_pages > 0 {
        println!("  failed message pages: {}", report.failed_pages);
    }
    for kind in &report.failed_collections {
        println!("  failed collection: {}", kind);
    }
    if let Some(media) = &report.media {
        println!(
            "Media: {} transferred, {} failed, {} unfinished{}",
            media.transferred,
            media.failed,
            media.unfinished,
            if media.timed_out { " (timed out)" } else { "" }
        );
    }
}
