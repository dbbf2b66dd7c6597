// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Field Codec
//!
//! String-level wrapper around [`encrypt`]/[`decrypt`] used for every
//! encrypted entity field. Ciphertext travels as standard base64 so it can
//! sit inside JSON bodies and push payloads unchanged.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

use super::encryption::{decrypt, encrypt, EncryptionError, SymmetricKey};

/// In-band marker shown in place of a display string that failed to decrypt.
pub const DECRYPTION_ERROR_MARKER: &str = "error decrypting";

/// A single field could not be turned back into plaintext.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64")]
    Malformed,
    #[error("cipher rejected field: {0}")]
    Cipher(#[from] EncryptionError),
    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,
}

/// Encrypts and decrypts string fields with the account key.
#[derive(Debug, Clone, Copy)]
pub struct FieldCodec<'k> {
    key: &'k SymmetricKey,
}

impl<'k> FieldCodec<'k> {
    pub fn new(key: &'k SymmetricKey) -> Self {
        FieldCodec { key }
    }

    /// Encrypts a plaintext field into its wire form.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let sealed = encrypt(self.key, plaintext.as_bytes())?;
        Ok(BASE64.encode(sealed))
    }

    /// Encrypts an optional field, passing `None` through.
    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, EncryptionError> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }

    /// Decrypts a wire field.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError> {
        let sealed = BASE64
            .decode(ciphertext.trim())
            .map_err(|_| DecryptionError::Malformed)?;
        let plain = decrypt(self.key, &sealed)?;
        String::from_utf8(plain).map_err(|_| DecryptionError::InvalidUtf8)
    }

    /// Decrypts an optional wire field. Empty strings are treated as absent.
    pub fn decrypt_opt(&self, ciphertext: Option<&str>) -> Result<Option<String>, DecryptionError> {
        match ciphertext {
            None => Ok(None),
            Some(c) if c.is_empty() => Ok(None),
            Some(c) => self.decrypt(c).map(Some),
        }
    }

    /// Decrypts a display-only field, substituting [`DECRYPTION_ERROR_MARKER`]
    /// on failure.
    pub fn decrypt_display(&self, ciphertext: &str) -> String {
        match self.decrypt(ciphertext) {
            Ok(plain) => plain,
            Err(e) => {
                tracing::debug!(error = %e, "display field failed to decrypt");
                DECRYPTION_ERROR_MARKER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marker_on_garbage() {
        let key = SymmetricKey::generate();
        let codec = FieldCodec::new(&key);
        assert_eq!(codec.decrypt_display("%%%"), DECRYPTION_ERROR_MARKER);
    }

    #[test]
    fn test_empty_optional_is_none() {
        let key = SymmetricKey::generate();
        let codec = FieldCodec::new(&key);
        assert_eq!(codec.decrypt_opt(Some("")).unwrap(), None);
        assert_eq!(codec.decrypt_opt(None).unwrap(), None);
    }

    #[test]
    fn test_ciphertext_is_not_plaintext() {
        let key = SymmetricKey::generate();
        let codec = FieldCodec::new(&key);
        let sealed = codec.encrypt("hello there").unwrap();
        assert!(!sealed.contains("hello"));
    }
}
