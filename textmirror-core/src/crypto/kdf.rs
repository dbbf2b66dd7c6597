// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account Key Derivation
//!
//! Every device of an account derives the same key from the account
//! passphrase and a server-provided salt, so ciphertext written by one
//! device opens on all the others.

use std::num::NonZeroU32;

use ring::pbkdf2;
use thiserror::Error;
use zeroize::Zeroizing;

use super::SymmetricKey;

/// PBKDF2-HMAC-SHA256 rounds for account keys.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdfError {
    #[error("iteration count must be non-zero")]
    ZeroIterations,

    #[error("salt must not be empty")]
    EmptySalt,
}

/// PBKDF2-HMAC-SHA256 with an explicit round count.
pub fn derive_key_pbkdf2(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SymmetricKey, KdfError> {
    let rounds = NonZeroU32::new(iterations).ok_or(KdfError::ZeroIterations)?;
    if salt.is_empty() {
        return Err(KdfError::EmptySalt);
    }

    let mut out = Zeroizing::new([0u8; 32]);
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, rounds, salt, password, &mut out[..]);
    Ok(SymmetricKey::from_bytes(*out))
}

/// The account key for `passphrase`, using [`PBKDF2_ITERATIONS`].
pub fn derive_account_key(passphrase: &str, salt: &str) -> Result<SymmetricKey, KdfError> {
    derive_key_pbkdf2(passphrase.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_key() {
        let a = derive_key_pbkdf2(b"secret", b"salt", 1000).unwrap();
        let b = derive_key_pbkdf2(b"secret", b"salt", 1000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert_eq!(
            derive_key_pbkdf2(b"secret", b"salt", 0).unwrap_err(),
            KdfError::ZeroIterations
        );
        assert_eq!(derive_account_key("secret", "").unwrap_err(), KdfError::EmptySalt);
    }
}
