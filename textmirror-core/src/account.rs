// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Identity/Account Context
//!
//! The value every sync operation is parameterized by. It is immutable for
//! the duration of a sync run; a primary-device handoff produces a new
//! context for the next run.

use thiserror::Error;

use crate::crypto::{derive_account_key, FieldCodec, KdfError, SymmetricKey};

/// Account context errors.
#[derive(Error, Debug)]
pub enum AccountError {
    /// No key material is available; the authentication flow must run.
    #[error("no encryption key available for account")]
    MissingKey,

    #[error("account id must not be empty")]
    EmptyAccountId,

    #[error("key derivation failed: {0}")]
    Kdf(#[from] KdfError),
}

/// Identity of this device within an account plus the account key.
#[derive(Clone)]
pub struct AccountContext {
    account_id: String,
    device_id: i64,
    is_primary: bool,
    key: SymmetricKey,
}

impl std::fmt::Debug for AccountContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountContext")
            .field("account_id", &self.account_id)
            .field("device_id", &self.device_id)
            .field("is_primary", &self.is_primary)
            .finish_non_exhaustive()
    }
}

impl AccountContext {
    /// Creates a context from an already derived key.
    pub fn new(
        account_id: impl Into<String>,
        device_id: i64,
        is_primary: bool,
        key: SymmetricKey,
    ) -> Result<Self, AccountError> {
        let account_id = account_id.into();
        if account_id.is_empty() {
            return Err(AccountError::EmptyAccountId);
        }
        Ok(AccountContext {
            account_id,
            device_id,
            is_primary,
            key,
        })
    }

    /// Derives the account key from the passphrase and server salt.
    ///
    /// A missing passphrase is the one fatal condition of the sync core and
    /// is reported as [`AccountError::MissingKey`].
    pub fn derive(
        account_id: impl Into<String>,
        device_id: i64,
        is_primary: bool,
        passphrase: Option<&str>,
        salt: &str,
    ) -> Result<Self, AccountError> {
        let passphrase = passphrase
            .filter(|p| !p.is_empty())
            .ok_or(AccountError::MissingKey)?;
        let key = derive_account_key(passphrase, salt)?;
        Self::new(account_id, device_id, is_primary, key)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn device_id(&self) -> i64 {
        self.device_id
    }

    /// Returns true if this device performs real outbound sends.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Field codec bound to the account key.
    pub fn codec(&self) -> FieldCodec<'_> {
        FieldCodec::new(&self.key)
    }

    /// Returns a copy of this context with a different primary flag.
    pub fn with_primary(&self, is_primary: bool) -> Self {
        AccountContext {
            is_primary,
            ..self.clone()
        }
    }

    /// Returns true if `device_id` names this device.
    pub fn is_own_device(&self, device_id: Option<i64>) -> bool {
        device_id == Some(self.device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_passphrase_is_missing_key() {
        let result = AccountContext::derive("acct", 1, true, None, "salt");
        assert!(matches!(result, Err(AccountError::MissingKey)));
    }

    #[test]
    fn test_two_devices_derive_same_key() {
        let a = AccountContext::derive("acct", 1, true, Some("pw"), "salt").unwrap();
        let b = AccountContext::derive("acct", 2, false, Some("pw"), "salt").unwrap();
        assert_eq!(a.key(), b.key());
        assert_ne!(a.device_id(), b.device_id());
    }

    #[test]
    fn test_debug_hides_key() {
        let ctx = AccountContext::new("acct", 1, false, SymmetricKey::generate()).unwrap();
        assert!(!format!("{:?}", ctx).contains("key"));
    }
}
