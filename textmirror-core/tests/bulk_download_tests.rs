// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for sync::downloader

mod common;

use std::num::NonZeroUsize;
use std::sync::Arc;

use common::fixtures::*;
use tempfile::TempDir;
use textmirror_core::attachments::AttachmentTransfer;
use textmirror_core::crypto::{encrypt, FieldCodec};
use textmirror_core::model::PENDING_MEDIA_DATA;
use textmirror_core::remote::{
    BlacklistBody, ContactBody, ConversationBody, DraftBody, MockBlobStore, MockContactDirectory,
    MockRemote, ScheduledMessageBody,
};
use textmirror_core::sync::{BulkDownloader, FeedbackLoop};
use textmirror_core::{EntityKind, SyncConfig};

fn seeded_messages(remote: &MockRemote, count: i64) {
    remote.seed_messages((0..count).map(|i| sealed_message(&text_message(i, i % 5, i, "m"))));
}

#[test]
fn test_650_messages_fetched_in_three_pages_plus_terminator() {
    let storage = storage();
    let remote = MockRemote::new();
    seeded_messages(&remote, 650);
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(
        remote.message_fetches(),
        vec![(300, 0), (300, 300), (300, 600), (300, 650)]
    );
    assert_eq!(report.messages, 650);
    assert_eq!(storage.count_messages().unwrap(), 650);
}

#[test]
fn test_empty_account_downloads_nothing() {
    let storage = storage();
    let remote = MockRemote::new();
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(remote.message_fetches(), vec![(300, 0)]);
    assert_eq!(report.messages, 0);
    assert!(report.failed_collections.is_empty());
}

#[test]
fn test_download_replaces_local_rows() {
    let storage = storage();
    storage
        .transaction(|s| {
            s.insert_message(&text_message(9_999, 1, 0, "stale"))?;
            s.insert_conversation(&conversation(9_999, "000", 0))
        })
        .unwrap();
    let remote = MockRemote::new();
    seeded_messages(&remote, 3);
    let config = SyncConfig::default();

    BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert!(storage.get_message(9_999).unwrap().is_none());
    assert!(storage.get_conversation(9_999).unwrap().is_none());
    assert_eq!(storage.count_messages().unwrap(), 3);
}

#[test]
fn test_one_undecryptable_conversation_is_isolated() {
    let storage = storage();
    let remote = MockRemote::new();
    let mut bodies: Vec<ConversationBody> = (1..=4)
        .map(|i| sealed_conversation(&conversation(i, &format!("55500000{:02}", i), i)))
        .collect();
    let foreign = other_key();
    bodies.push(
        ConversationBody::seal(&conversation(5, "5550000005", 5), FieldCodec::new(&foreign))
            .unwrap(),
    );
    remote.seed_conversations(bodies);
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(remote.list_count(EntityKind::Conversations), 2);
    assert_eq!(report.conversations, 4);
    assert_eq!(report.skipped_records, 1);
    assert_eq!(storage.count_conversations().unwrap(), 4);
    assert!(storage.get_conversation(5).unwrap().is_none());
}

#[test]
fn test_conversation_fetch_retried_once_on_transport_error() {
    let storage = storage();
    let remote = MockRemote::new();
    remote.fail_list(EntityKind::Conversations);
    seeded_messages(&remote, 10);
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(remote.list_count(EntityKind::Conversations), 2);
    assert_eq!(report.failed_collections, vec![EntityKind::Conversations]);
    assert_eq!(report.messages, 10);
}

#[test]
fn test_failed_collection_degrades_to_empty() {
    let storage = storage();
    let remote = MockRemote::new();
    let ctx = primary_ctx();
    let codec = ctx.codec();
    remote.fail_list(EntityKind::Contacts);
    remote.seed_blacklists([BlacklistBody::seal(&blacklist(1, "5550001111"), codec).unwrap()]);
    remote.seed_drafts([DraftBody::seal(&draft(1, 1, "later"), codec).unwrap()]);
    remote.seed_scheduled_messages([
        ScheduledMessageBody::seal(&scheduled(1, "5550001111", 9_000), codec).unwrap(),
    ]);
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&ctx)
        .unwrap();

    assert_eq!(report.failed_collections, vec![EntityKind::Contacts]);
    assert_eq!(report.contacts, 0);
    assert_eq!(report.blacklists, 1);
    assert_eq!(report.drafts, 1);
    assert_eq!(report.scheduled_messages, 1);
    assert_eq!(storage.read(|s| s.list_scheduled()).unwrap()[0].to, "5550001111");
}

#[test]
fn test_failed_page_is_retried_at_same_offset() {
    let storage = storage();
    let remote = MockRemote::new();
    seeded_messages(&remote, 40);
    remote.fail_message_page(20);
    let config = SyncConfig::default().with_page_size(NonZeroUsize::new(20).unwrap());

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    let offsets: Vec<usize> = remote.message_fetches().iter().map(|(_, o)| *o).collect();
    assert_eq!(offsets, vec![0, 20, 20, 20, 20, 20]);
    assert_eq!(report.failed_pages, 5);
    assert_eq!(report.messages, 20);
}

#[test]
fn test_undecryptable_message_skipped_individually() {
    let storage = storage();
    let remote = MockRemote::new();
    seeded_messages(&remote, 3);
    let foreign = other_key();
    let mut bad = sealed_message(&text_message(3, 0, 3, "x"));
    bad.mime_type = FieldCodec::new(&foreign).encrypt("text/plain").unwrap();
    remote.seed_messages([bad]);
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(report.messages, 3);
    assert_eq!(report.skipped_records, 1);
}

#[test]
fn test_contacts_and_images_resolved() {
    let storage = storage();
    let remote = MockRemote::new();
    let ctx = primary_ctx();
    remote.seed_conversations([sealed_conversation(&conversation(1, "5551234567", 0))]);
    let alice = ContactBody::seal(&contact(1, "5551234567", "Alice"), ctx.codec()).unwrap();
    remote.seed_contacts([alice]);
    let directory = MockContactDirectory::new().with_image("5551234567", "content://photos/1");
    let config = SyncConfig::default();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .with_directory(&directory)
        .download(&ctx)
        .unwrap();

    assert_eq!(report.contacts, 1);
    assert_eq!(
        storage.get_conversation(1).unwrap().unwrap().image_uri.as_deref(),
        Some("content://photos/1")
    );
}

#[test]
fn test_feedback_loop_resumed_after_download() {
    let storage = storage();
    let remote = MockRemote::new();
    let feedback = FeedbackLoop::new();
    let config = SyncConfig::default();

    BulkDownloader::new(&storage, &remote, &config)
        .with_feedback(&feedback)
        .download(&primary_ctx())
        .unwrap();

    assert!(!feedback.is_paused());
}

#[test]
fn test_media_downloaded_after_rows_commit() {
    let media = TempDir::new().unwrap();
    let storage = storage();
    let remote = MockRemote::new();
    let blobs = Arc::new(MockBlobStore::new());
    for id in [1, 2] {
        remote.seed_messages([sealed_message(&media_message(id, 1, id, PENDING_MEDIA_DATA))]);
        blobs.insert(
            format!("{}/{}", ACCOUNT_ID, id),
            encrypt(&account_key(), b"photo").unwrap(),
        );
    }
    remote.seed_messages([sealed_message(&media_message(3, 1, 3, PENDING_MEDIA_DATA))]);
    let config = SyncConfig::default().with_media_dir(media.path());
    let attachments = AttachmentTransfer::new(blobs.clone(), &config).unwrap();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .with_attachments(&attachments)
        .download(&primary_ctx())
        .unwrap();

    let media_report = report.media.unwrap();
    assert_eq!(media_report.transferred, 2);
    assert_eq!(media_report.failed, 1);
    assert!(storage.get_message(1).unwrap().unwrap().data.starts_with("file://"));
    assert_eq!(
        storage.get_message(3).unwrap().unwrap().data,
        PENDING_MEDIA_DATA
    );
}

#[test]
fn test_media_downloads_capped_to_newest() {
    let media = TempDir::new().unwrap();
    let storage = storage();
    let remote = MockRemote::new();
    let blobs = Arc::new(MockBlobStore::new());
    for id in 1..=5 {
        remote.seed_messages([sealed_message(&media_message(
            id,
            1,
            id * 100,
            PENDING_MEDIA_DATA,
        ))]);
        blobs.insert(
            format!("{}/{}", ACCOUNT_ID, id),
            encrypt(&account_key(), b"photo").unwrap(),
        );
    }
    let mut config = SyncConfig::default().with_media_dir(media.path());
    config.max_media_downloads = 2;
    let attachments = AttachmentTransfer::new(blobs.clone(), &config).unwrap();

    let report = BulkDownloader::new(&storage, &remote, &config)
        .with_attachments(&attachments)
        .download(&primary_ctx())
        .unwrap();

    assert_eq!(report.media.unwrap().transferred, 2);
    let mut requested = blobs.requested();
    requested.sort();
    assert_eq!(requested, vec!["acct-1/4".to_string(), "acct-1/5".to_string()]);
    for id in [4, 5] {
        assert!(storage.get_message(id).unwrap().unwrap().data.starts_with("file://"));
    }
    for id in 1..=3 {
        assert_eq!(
            storage.get_message(id).unwrap().unwrap().data,
            PENDING_MEDIA_DATA
        );
    }
}
