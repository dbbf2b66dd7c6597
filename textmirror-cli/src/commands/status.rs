// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Status Command
//!
//! Summarizes the local store without touching the network.

use anyhow::Result;
use textmirror_core::storage::{AccountState, StorageError};
use textmirror_core::Storage;

use crate::config::CliConfig;

/// Local store summary.
#[derive(Debug, PartialEq, Eq)]
pub struct Status {
    pub schema_version: u32,
    pub messages: usize,
    pub conversations: usize,
    pub contacts: usize,
    pub drafts: usize,
    pub scheduled_messages: usize,
    pub blacklists: usize,
    pub pending_media: usize,
    pub account: AccountState,
}

pub fn collect(storage: &Storage, media_limit: usize) -> Result<Status, StorageError> {
    let schema_version = storage.schema_version()?;
    storage.read(|s| {
        Ok(Status {
            schema_version,
            messages: s.count_messages()?,
            conversations: s.count_conversations()?,
            contacts: s.list_contacts()?.len(),
            drafts: s.list_drafts()?.len(),
            scheduled_messages: s.list_scheduled()?.len(),
            blacklists: s.list_blacklists()?.len(),
            pending_media: s.pending_media_messages(media_limit)?.len(),
            account: s.load_account_state()?,
        })
    })
}

pub fn run(config: &CliConfig) -> Result<()> {
    let storage = config.open_storage()?;
    let status = collect(&storage, usize::MAX)?;

    println!("Database: {} (schema v{})", config.db_path.display(), status.schema_version);
    println!("  messages:           {}", status.messages);
    println!("  conversations:      {}", status.conversations);
    println!("  contacts:           {}", status.contacts);
    println!("  drafts:             {}", status.drafts);
    println!("  scheduled messages: {}", status.scheduled_messages);
    println!("  blacklists:         {}", status.blacklists);
    println!("  pending media:      {}", status.pending_media);
    println!();
    println!("Account:");
    println!(
        "  device:       {}",
        if status.account.is_primary { "primary" } else { "secondary" }
    );
    println!(
        "  subscription: {:?} (expires {})",
        status.account.subscription.kind, status.account.subscription.expiration
    );
    if let Some(name) = &status.account.real_name {
        println!("  name:         {}", name);
    }
    if let Some(phone) = &status.account.phone_number {
        println!("  phone:        {}", phone);
    }
    Ok(())
}
