// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for storage

mod common;

use common::fixtures::*;
use textmirror_core::model::{MessageType, Subscription, SubscriptionType, PENDING_MEDIA_DATA};
use textmirror_core::storage::{
    AccountState, ConversationUpdate, MessageUpdate, SettingValue, StorageError,
};

#[test]
fn test_insert_message_ignores_existing_id() {
    let storage = storage();
    let first = text_message(1, 10, 1_000, "hello");
    let mut again = first.clone();
    again.data = "changed".into();

    let (a, b) = storage
        .transaction(|s| {
            let a = s.insert_message(&first)?;
            let b = s.insert_message(&again)?;
            Ok::<_, StorageError>((a, b))
        })
        .unwrap();

    assert!(a);
    assert!(!b);
    assert_eq!(storage.count_messages().unwrap(), 1);
    assert_eq!(storage.get_message(1).unwrap().unwrap().data, "hello");
}

#[test]
fn test_bulk_insert_counts_new_rows_only() {
    let storage = storage();
    let messages: Vec<_> = (0..5).map(|i| text_message(i, 10, i * 10, "x")).collect();
    storage.transaction(|s| s.insert_messages(&messages[..2])).unwrap();
    let written = storage.transaction(|s| s.insert_messages(&messages)).unwrap();
    assert_eq!(written, 3);
}

#[test]
fn test_messages_page_in_timestamp_order() {
    let storage = storage();
    let messages = vec![
        text_message(3, 10, 300, "c"),
        text_message(1, 10, 100, "a"),
        text_message(2, 10, 200, "b"),
    ];
    storage.transaction(|s| s.insert_messages(&messages)).unwrap();

    let page = storage.read(|s| s.list_messages_page(1, 2)).unwrap();
    let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_partial_message_update_keeps_other_columns() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_message(&text_message(1, 10, 1_000, "hi")))
        .unwrap();
    let update = MessageUpdate {
        read: Some(true),
        ..Default::default()
    };
    assert!(storage.transaction(|s| s.update_message(1, &update)).unwrap());

    let stored = storage.get_message(1).unwrap().unwrap();
    assert!(stored.read);
    assert!(!stored.seen);
    assert_eq!(stored.message_type, MessageType::Received);
    assert_eq!(stored.timestamp, 1_000);
}

#[test]
fn test_update_absent_message_is_noop() {
    let storage = storage();
    let update = MessageUpdate {
        read: Some(true),
        ..Default::default()
    };
    assert!(!storage.transaction(|s| s.update_message(99, &update)).unwrap());
    assert_eq!(storage.count_messages().unwrap(), 0);
}

#[test]
fn test_pending_and_local_media_split() {
    let storage = storage();
    let messages = vec![
        media_message(1, 10, 100, PENDING_MEDIA_DATA),
        media_message(2, 10, 300, PENDING_MEDIA_DATA),
        media_message(3, 10, 200, "file:///media/3.jpg"),
        text_message(4, 10, 400, "firebase but text"),
    ];
    storage.transaction(|s| s.insert_messages(&messages)).unwrap();

    let pending = storage.read(|s| s.pending_media_messages(10)).unwrap();
    let ids: Vec<i64> = pending.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2, 1]);

    let pending = storage.read(|s| s.pending_media_messages(1)).unwrap();
    assert_eq!(pending.len(), 1);

    let local = storage.read(|s| s.local_media_messages(10)).unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, 3);
}

#[test]
fn test_media_queries_ignore_text_mime_case() {
    let storage = storage();
    let mut shouted = text_message(1, 10, 100, PENDING_MEDIA_DATA);
    shouted.mime_type = "TEXT/PLAIN".to_string();
    let mut mixed = text_message(2, 10, 200, "hello");
    mixed.mime_type = "Text/Plain".to_string();
    storage
        .transaction(|s| s.insert_messages(&[shouted, mixed]))
        .unwrap();

    assert!(storage.read(|s| s.pending_media_messages(10)).unwrap().is_empty());
    assert!(storage.read(|s| s.local_media_messages(10)).unwrap().is_empty());
}

#[test]
fn test_cleanup_deletes_only_older_messages() {
    let storage = storage();
    let messages = vec![
        text_message(1, 10, 100, "old"),
        text_message(2, 20, 150, "old elsewhere"),
        text_message(3, 10, 500, "new"),
    ];
    storage.transaction(|s| s.insert_messages(&messages)).unwrap();

    let removed = storage
        .transaction(|s| s.delete_conversation_messages_before(10, 200))
        .unwrap();
    assert_eq!(removed, 1);
    assert!(storage.get_message(2).unwrap().is_some());

    let removed = storage.transaction(|s| s.delete_messages_before(200)).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(storage.count_messages().unwrap(), 1);
}

#[test]
fn test_conversation_matcher_is_unique() {
    let storage = storage();
    let first = conversation(1, "+1 555 123 4567", 1_000);
    let same_people = conversation(2, "5551234567", 2_000);

    assert!(storage.transaction(|s| s.insert_conversation(&first)).unwrap());
    assert!(!storage.transaction(|s| s.insert_conversation(&same_people)).unwrap());
    assert_eq!(storage.count_conversations().unwrap(), 1);

    let found = storage
        .read(|s| s.find_conversation_by_phone_numbers("(555) 123-4567"))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, 1);
}

#[test]
fn test_conversation_phone_update_recomputes_matcher() {
    let storage = storage();
    storage
        .transaction(|s| s.insert_conversation(&conversation(1, "5551111111", 0)))
        .unwrap();
    let update = ConversationUpdate {
        phone_numbers: Some("5552222222".into()),
        ..Default::default()
    };
    storage
        .transaction(|s| s.update_conversation(1, &update))
        .unwrap();

    let found = storage
        .read(|s| s.find_conversation_by_phone_numbers("5552222222"))
        .unwrap();
    assert_eq!(found.map(|c| c.id), Some(1));
}

#[test]
fn test_conversations_list_pinned_first() {
    let storage = storage();
    let mut pinned = conversation(1, "111", 100);
    pinned.pinned = true;
    storage
        .transaction(|s| {
            s.insert_conversation(&pinned)?;
            s.insert_conversation(&conversation(2, "222", 300))?;
            s.insert_conversation(&conversation(3, "333", 200))
        })
        .unwrap();

    let ids: Vec<i64> = storage
        .read(|s| s.list_conversations())
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_delete_conversation_cascades() {
    let storage = storage();
    storage
        .transaction(|s| {
            s.insert_conversation(&conversation(1, "111", 0))?;
            s.insert_message(&text_message(1, 1, 0, "a"))?;
            s.insert_message(&text_message(2, 2, 0, "b"))?;
            s.insert_draft(&draft(1, 1, "unsent"))
        })
        .unwrap();

    assert!(storage.transaction(|s| s.delete_conversation(1)).unwrap());
    assert!(!storage.transaction(|s| s.delete_conversation(1)).unwrap());
    assert_eq!(storage.count_messages().unwrap(), 1);
    assert!(storage.read(|s| s.list_drafts()).unwrap().is_empty());
}

#[test]
fn test_contact_upsert_by_phone_number() {
    let storage = storage();
    storage
        .transaction(|s| {
            s.upsert_contact(&contact(1, "+15551234567", "Alice"))?;
            s.upsert_contact(&contact(1, "+15551234567", "Alice Smith"))
        })
        .unwrap();

    let contacts = storage.read(|s| s.list_contacts()).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Alice Smith");

    let removed = storage
        .transaction(|s| s.delete_contacts_by_ids(&[1, 2]))
        .unwrap();
    assert_eq!(removed, 1);
}

#[test]
fn test_scheduled_update_requires_row() {
    let storage = storage();
    let mut job = scheduled(1, "5551234567", 5_000);
    assert!(!storage.transaction(|s| s.update_scheduled(&job)).unwrap());

    storage.transaction(|s| s.insert_scheduled(&job)).unwrap();
    job.data = "running late".into();
    assert!(storage.transaction(|s| s.update_scheduled(&job)).unwrap());
    assert_eq!(
        storage.read(|s| s.list_scheduled()).unwrap()[0].data,
        "running late"
    );
}

#[test]
fn test_blacklist_insert_is_idempotent() {
    let storage = storage();
    let entry = blacklist(1, "5550000000");
    assert!(storage.transaction(|s| s.insert_blacklist(&entry)).unwrap());
    assert!(!storage.transaction(|s| s.insert_blacklist(&entry)).unwrap());
    assert!(storage.transaction(|s| s.delete_blacklist(1)).unwrap());
    assert!(storage.read(|s| s.list_blacklists()).unwrap().is_empty());
}

#[test]
fn test_account_state_defaults_and_updates() {
    let storage = storage();
    assert_eq!(
        storage.read(|s| s.load_account_state()).unwrap(),
        AccountState::default()
    );

    let subscription = Subscription {
        kind: SubscriptionType::Subscriber,
        expiration: 1_900_000_000_000,
    };
    storage
        .transaction(|s| {
            s.set_primary(true)?;
            s.set_subscription(subscription)?;
            s.set_profile(Some("Alice"), None)?;
            s.set_profile(None, Some("+15551234567"))
        })
        .unwrap();

    let state = storage.read(|s| s.load_account_state()).unwrap();
    assert!(state.is_primary);
    assert_eq!(state.subscription, subscription);
    assert_eq!(state.real_name.as_deref(), Some("Alice"));
    assert_eq!(state.phone_number.as_deref(), Some("+15551234567"));
}

#[test]
fn test_settings_keep_their_type() {
    let storage = storage();
    let values = [
        ("dark_mode", SettingValue::Boolean(true)),
        ("font_size", SettingValue::Integer(14)),
        ("snooze_until", SettingValue::Long(1_700_000_000_000)),
        ("signature", SettingValue::String("sent from my tablet".into())),
    ];
    storage
        .transaction(|s| {
            for (key, value) in &values {
                s.put_setting(key, value)?;
            }
            Ok::<_, StorageError>(())
        })
        .unwrap();

    for (key, value) in &values {
        let stored = storage.read(|s| s.get_setting(key)).unwrap();
        assert_eq!(stored.as_ref(), Some(value));
    }
    assert_eq!(storage.read(|s| s.get_setting("missing")).unwrap(), None);
}

#[test]
fn test_wipe_entities_keeps_account_state() {
    let storage = storage();
    storage
        .transaction(|s| {
            s.insert_conversation(&conversation(1, "111", 0))?;
            s.insert_message(&text_message(1, 1, 0, "a"))?;
            s.set_primary(true)?;
            s.set_feature_flag("new_ui", true)
        })
        .unwrap();

    storage.transaction(|s| s.wipe_entities()).unwrap();
    assert_eq!(storage.count_messages().unwrap(), 0);
    assert_eq!(storage.count_conversations().unwrap(), 0);
    assert!(storage.read(|s| s.load_account_state()).unwrap().is_primary);
    assert_eq!(storage.read(|s| s.feature_flag("new_ui")).unwrap(), Some(true));

    storage.transaction(|s| s.wipe_account()).unwrap();
    assert!(!storage.read(|s| s.load_account_state()).unwrap().is_primary);
    assert_eq!(storage.read(|s| s.feature_flag("new_ui")).unwrap(), None);
}

#[test]
fn test_failed_transaction_rolls_back() {
    let storage = storage();
    let result: Result<(), StorageError> = storage.transaction(|s| {
        s.insert_message(&text_message(1, 1, 0, "a"))?;
        Err(StorageError::Serialization("boom".into()))
    });
    assert!(result.is_err());
    assert_eq!(storage.count_messages().unwrap(), 0);
}
