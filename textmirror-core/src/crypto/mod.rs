// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cryptography
//!
//! Symmetric encryption for rows and attachments leaving the device, plus
//! the password-based derivation of the per-account key.

pub mod encryption;
pub mod field;
pub mod kdf;

pub use encryption::{decrypt, encrypt, random_id, EncryptionError, SymmetricKey};
pub use field::{DecryptionError, FieldCodec, DECRYPTION_ERROR_MARKER};
pub use kdf::{derive_account_key, derive_key_pbkdf2, KdfError, PBKDF2_ITERATIONS};
