// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for sync::uploader

mod common;

use std::sync::Arc;

use common::fixtures::*;
use tempfile::TempDir;
use textmirror_core::attachments::{file_uri, AttachmentTransfer};
use textmirror_core::crypto::decrypt;
use textmirror_core::model::PENDING_MEDIA_DATA;
use textmirror_core::remote::{MockBlobStore, MockRemote, RemoteCall};
use textmirror_core::sync::{BulkDownloader, BulkUploader};
use textmirror_core::{EntityKind, SyncConfig};

fn adds(remote: &MockRemote, kind: EntityKind) -> Vec<usize> {
    remote
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RemoteCall::Add { kind: k, count } if k == kind => Some(count),
            _ => None,
        })
        .collect()
}

#[test]
fn test_messages_uploaded_in_pages() {
    let storage = storage();
    let messages: Vec<_> = (0..650).map(|i| text_message(i, 1, i, "m")).collect();
    storage.transaction(|s| s.insert_messages(&messages)).unwrap();
    let remote = MockRemote::new();
    let config = SyncConfig::default();

    let report = BulkUploader::new(&storage, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    assert_eq!(adds(&remote, EntityKind::Messages), vec![300, 300, 50]);
    let messages = report.collection(EntityKind::Messages).unwrap();
    assert_eq!(messages.records, 650);
    assert_eq!(messages.pages, 3);
    assert!(report.is_success());
}

#[test]
fn test_empty_collections_are_not_sent() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_conversation(&conversation(1, "5551234567", 0)))
        .unwrap();
    let remote = MockRemote::new();
    let config = SyncConfig::default();

    BulkUploader::new(&storage, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    assert_eq!(adds(&remote, EntityKind::Conversations), vec![1]);
    assert!(adds(&remote, EntityKind::Messages).is_empty());
    assert!(adds(&remote, EntityKind::Contacts).is_empty());
}

#[test]
fn test_media_rows_carry_placeholder() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_message(&media_message(1, 1, 0, "file:///sdcard/cat.jpg")))
        .unwrap();
    let remote = MockRemote::new();
    let config = SyncConfig::default();
    let ctx = primary_ctx();

    BulkUploader::new(&storage, &remote, &config)
        .upload(&ctx)
        .unwrap();

    let uploaded = remote.stored_messages();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(ctx.codec().decrypt(&uploaded[0].data).unwrap(), PENDING_MEDIA_DATA);
    assert_eq!(
        storage.get_message(1).unwrap().unwrap().data,
        "file:///sdcard/cat.jpg"
    );
}

#[test]
fn test_uploaded_fields_are_ciphertext() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_conversation(&conversation(1, "5551234567", 0)))
        .unwrap();
    let remote = MockRemote::new();
    let config = SyncConfig::default();

    BulkUploader::new(&storage, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    let body = &remote.stored_conversations()[0];
    assert!(!body.phone_numbers.contains("5551234567"));
    assert!(!body.title.contains("5551234567"));
}

#[test]
fn test_conversations_retried_once() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_conversation(&conversation(1, "5551234567", 0)))
        .unwrap();
    let remote = MockRemote::new();
    remote.fail_adds(EntityKind::Conversations, 1);
    let config = SyncConfig::default();

    let report = BulkUploader::new(&storage, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    assert_eq!(adds(&remote, EntityKind::Conversations), vec![1, 1]);
    assert!(report.is_success());
    assert_eq!(remote.stored_conversations().len(), 1);
}

#[test]
fn test_persistent_failure_is_reported_not_raised() {
    let storage = storage();
    storage
        .transaction(|s| {
            s.insert_conversation(&conversation(1, "5551234567", 0))?;
            s.upsert_contact(&contact(1, "5551234567", "Alice"))
        })
        .unwrap();
    let remote = MockRemote::new();
    remote.fail_adds(EntityKind::Conversations, 5);
    remote.fail_adds(EntityKind::Contacts, 1);
    let config = SyncConfig::default();

    let report = BulkUploader::new(&storage, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.collection(EntityKind::Conversations).unwrap().failed_pages, 1);
    // Contacts get no retry.
    assert_eq!(adds(&remote, EntityKind::Contacts), vec![1]);
    assert_eq!(report.collection(EntityKind::Contacts).unwrap().failed_pages, 1);
}

#[test]
fn test_media_bytes_uploaded_encrypted() {
    let media = TempDir::new().unwrap();
    let photo = media.path().join("cat.jpg");
    std::fs::write(&photo, b"meow").unwrap();
    let storage = storage();
    storage
        .transaction(|s| s.insert_message(&media_message(5, 1, 0, &file_uri(&photo))))
        .unwrap();
    let remote = MockRemote::new();
    let blobs = Arc::new(MockBlobStore::new());
    let config = SyncConfig::default().with_media_dir(media.path());
    let attachments = AttachmentTransfer::new(blobs.clone(), &config).unwrap();

    let report = BulkUploader::new(&storage, &remote, &config)
        .with_attachments(&attachments)
        .upload(&primary_ctx())
        .unwrap();

    assert_eq!(report.media.unwrap().transferred, 1);
    let stored = blobs.blob("acct-1/5").unwrap();
    assert_ne!(stored, b"meow".to_vec());
    assert_eq!(decrypt(&account_key(), &stored).unwrap(), b"meow".to_vec());
}

#[test]
fn test_upload_then_download_on_another_device() {
    let phone = storage();
    phone
        .transaction(|s| {
            s.insert_conversation(&conversation(1, "5551234567", 10))?;
            s.insert_message(&text_message(1, 1, 10, "first"))?;
            s.insert_message(&text_message(2, 1, 20, "second"))?;
            s.insert_draft(&draft(3, 1, "third?"))
        })
        .unwrap();
    let remote = MockRemote::new();
    let config = SyncConfig::default();
    BulkUploader::new(&phone, &remote, &config)
        .upload(&primary_ctx())
        .unwrap();

    let tablet = storage();
    BulkDownloader::new(&tablet, &remote, &config)
        .download(&secondary_ctx())
        .unwrap();

    assert_eq!(
        tablet.read(|s| s.list_messages()).unwrap(),
        phone.read(|s| s.list_messages()).unwrap()
    );
    assert_eq!(tablet.get_conversation(1).unwrap(), phone.get_conversation(1).unwrap());
    assert_eq!(tablet.read(|s| s.list_drafts()).unwrap().len(), 1);
}

#[test]
fn test_media_uploads_capped_to_newest() {
    let media = TempDir::new().unwrap();
    let storage = storage();
    for id in 1..=5 {
        let photo = media.path().join(format!("{}.jpg", id));
        std::fs::write(&photo, b"meow").unwrap();
        storage
            .transaction(|s| s.insert_message(&media_message(id, 1, id * 100, &file_uri(&photo))))
            .unwrap();
    }
    let remote = MockRemote::new();
    let blobs = Arc::new(MockBlobStore::new());
    let mut config = SyncConfig::default().with_media_dir(media.path());
    config.max_media_uploads = 2;
    let attachments = AttachmentTransfer::new(blobs.clone(), &config).unwrap();

    let report = BulkUploader::new(&storage, &remote, &config)
        .with_attachments(&attachments)
        .upload(&primary_ctx())
        .unwrap();

    assert_eq!(report.media.unwrap().transferred, 2);
    assert_eq!(blobs.len(), 2);
    assert!(blobs.blob("acct-1/4").is_some());
    assert!(blobs.blob("acct-1/5").is_some());
    assert!(blobs.blob("acct-1/3").is_none());
}
