// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies

use proptest::prelude::*;

/// Arbitrary field text, including non-ASCII.
pub fn field_text_strategy() -> impl Strategy<Value = String> {
    ".{0,200}"
}

/// Phone numbers in a handful of local and international formats.
pub fn phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{10,13}".prop_map(|n| format!("+{}", n)),
        "[0-9]{3}-[0-9]{3}-[0-9]{4}",
        "\\([0-9]{3}\\) [0-9]{3}-[0-9]{4}",
    ]
}

/// A collection length and a page size for pagination properties.
pub fn paging_strategy() -> impl Strategy<Value = (usize, usize)> {
    (0usize..1_000, 1usize..400)
}
