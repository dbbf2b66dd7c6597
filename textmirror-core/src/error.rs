// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Error Types
//!
//! Unified error type for the sync core. Only [`SyncError::MissingKey`] is
//! meant to reach the user: it tells the host to run authentication again.
//! Everything else is logged and healed by the next successful run.

use thiserror::Error;

use crate::account::AccountError;
use crate::apply::ApplyError;
use crate::attachments::AttachmentError;
use crate::crypto::EncryptionError;
use crate::remote::TransportError;
use crate::storage::StorageError;

/// Unified error type for sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No encryption key is available for the account.
    #[error("no encryption key available")]
    MissingKey,

    #[error("account error: {0}")]
    Account(AccountError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),

    /// A bulk transfer is already in progress on this engine.
    #[error("bulk sync already running")]
    AlreadyRunning,

    /// The background sync thread could not start or panicked.
    #[error("sync thread failed: {0}")]
    Thread(String),
}

impl From<AccountError> for SyncError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::MissingKey => SyncError::MissingKey,
            other => SyncError::Account(other),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_surfaces_as_sync_missing_key() {
        let err: SyncError = AccountError::MissingKey.into();
        assert!(matches!(err, SyncError::MissingKey));
    }
}
