// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entity Pagination
//!
//! Splits ordered collections into fixed-size pages for transfer and walks
//! remote collections page by page.

use std::num::NonZeroUsize;

/// Splits `items` into pages of at most `page_size` items.
///
/// Page `i` holds `items[i * page_size .. min((i + 1) * page_size, len)]`.
/// An empty input yields zero pages.
pub fn paginate<T: Clone>(items: &[T], page_size: NonZeroUsize) -> Vec<Vec<T>> {
    items.chunks(page_size.get()).map(<[T]>::to_vec).collect()
}

/// Concatenates pages back into one ordered collection.
pub fn reassemble<T>(pages: impl IntoIterator<Item = Vec<T>>) -> Vec<T> {
    pages.into_iter().flatten().collect()
}

/// Offset cursor used when pulling a remote collection page by page.
///
/// The next request starts at the number of records received so far, so a
/// short page never causes records to be skipped or fetched twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    page_size: NonZeroUsize,
    offset: usize,
    pages_fetched: usize,
}

impl PageCursor {
    pub fn new(page_size: NonZeroUsize) -> Self {
        PageCursor {
            page_size,
            offset: 0,
            pages_fetched: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Offset to request next.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of pages recorded with [`advance`](Self::advance).
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Records a received page of `received` records.
    pub fn advance(&mut self, received: usize) {
        self.offset += received;
        self.pages_fetched += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_last_page_is_short() {
        let items: Vec<u32> = (0..650).collect();
        let pages = paginate(&items, size(300));
        let lens: Vec<usize> = pages.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![300, 300, 50]);
    }

    #[test]
    fn test_empty_input_has_no_pages() {
        let items: Vec<u32> = Vec::new();
        assert!(paginate(&items, size(10)).is_empty());
    }

    #[test]
    fn test_cursor_advances_by_received_count() {
        let mut cursor = PageCursor::new(size(300));
        cursor.advance(300);
        cursor.advance(120);
        assert_eq!(cursor.offset(), 420);
        assert_eq!(cursor.pages_fetched(), 2);
    }
}
