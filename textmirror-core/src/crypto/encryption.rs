// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account Cipher
//!
//! Every value that can contain user content (row fields and attachment
//! bytes) is sealed here with the account key before it leaves the device.
//!
//! Sealed layout: `0x02 || nonce (24) || ciphertext || poly1305 tag (16)`.
//! The leading byte names the cipher; anything other than `0x02` is
//! rejected instead of being fed to the wrong algorithm.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    /// The RNG or the cipher refused to produce output.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Authentication failed: wrong key or tampered bytes.
    #[error("decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("ciphertext too short")]
    CiphertextTooShort,

    #[error("unknown cipher tag {0:#04x}")]
    UnknownAlgorithm(u8),
}

const CIPHER_XCHACHA20: u8 = 0x02;
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const MAC_LEN: usize = 16;

/// 256-bit account key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

impl PartialEq for SymmetricKey {
    /// Compares every byte regardless of where the first difference is.
    fn eq(&self, other: &Self) -> bool {
        let diff = self
            .0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        std::hint::black_box(diff) == 0
    }
}

impl Eq for SymmetricKey {}

fn random_bytes<const N: usize>() -> Result<[u8; N], EncryptionError> {
    let mut bytes = [0u8; N];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| EncryptionError::EncryptionFailed)?;
    Ok(bytes)
}

impl SymmetricKey {
    /// A fresh random key. Panics only if the OS RNG is unavailable.
    pub fn generate() -> Self {
        SymmetricKey(random_bytes().expect("system RNG unavailable"))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        SymmetricKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.0).into())
    }
}

/// Random positive 63-bit id for rows created on this device.
pub fn random_id() -> Result<i64, EncryptionError> {
    let bytes = random_bytes::<8>()?;
    Ok((u64::from_be_bytes(bytes) >> 1) as i64)
}

/// Seals `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let nonce = random_bytes::<NONCE_LEN>()?;
    let sealed = key
        .cipher()
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
    out.push(CIPHER_XCHACHA20);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Opens bytes produced by [`encrypt`].
pub fn decrypt(key: &SymmetricKey, sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let (&cipher_tag, rest) = sealed
        .split_first()
        .ok_or(EncryptionError::CiphertextTooShort)?;
    if cipher_tag != CIPHER_XCHACHA20 {
        return Err(EncryptionError::UnknownAlgorithm(cipher_tag));
    }
    if rest.len() < NONCE_LEN + MAC_LEN {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce, body) = rest.split_at(NONCE_LEN);
    key.cipher()
        .decrypt(XNonce::from_slice(nonce), body)
        .map_err(|_| EncryptionError::DecryptionFailed)
}
