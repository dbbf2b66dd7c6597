// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for pagination

mod common;

use std::num::NonZeroUsize;

use common::strategies::paging_strategy;
use proptest::prelude::*;
use textmirror_core::pagination::{paginate, reassemble, PageCursor};

fn size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn test_empty_collection_yields_no_pages() {
    let empty: Vec<i64> = Vec::new();
    assert_eq!(paginate(&empty, size(300)), Vec::<Vec<i64>>::new());
}

#[test]
fn test_exact_multiple_has_no_trailing_page() {
    let items: Vec<i64> = (0..600).collect();
    assert_eq!(paginate(&items, size(300)).len(), 2);
}

#[test]
fn test_cursor_follows_received_records() {
    let mut cursor = PageCursor::new(size(300));
    assert_eq!(cursor.page_size(), 300);
    for received in [300, 300, 50] {
        cursor.advance(received);
    }
    assert_eq!(cursor.offset(), 650);
    assert_eq!(cursor.pages_fetched(), 3);
}

proptest! {
    #[test]
    fn prop_pages_reassemble_to_input((len, page) in paging_strategy()) {
        let items: Vec<usize> = (0..len).collect();
        let pages = paginate(&items, size(page));
        prop_assert_eq!(pages.len(), len.div_ceil(page));
        prop_assert!(pages.iter().all(|p| !p.is_empty() && p.len() <= page));
        prop_assert!(pages.iter().rev().skip(1).all(|p| p.len() == page));
        prop_assert_eq!(reassemble(pages), items);
    }
}
