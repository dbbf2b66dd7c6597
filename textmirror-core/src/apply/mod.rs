// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Incremental Change Applier
//!
//! Steady-state sync path. Every push notification names one operation and
//! carries a JSON payload; the payload is decoded once into a typed
//! [`Operation`] and applied to the local store in its own transaction.
//! Repeat deliveries and out-of-order arrival are expected: every branch is
//! a guarded mutation that turns into a no-op when there is nothing to do.

mod applier;
mod operation;
pub mod payloads;

pub use applier::{ApplyOutcome, ChangeApplier, NoOpReason, PendingMedia};
pub use operation::{Notification, Operation};

use thiserror::Error;

use crate::attachments::AttachmentError;
use crate::crypto::{DecryptionError, EncryptionError};
use crate::remote::BodyError;
use crate::storage::StorageError;

/// Errors that abort a single operation.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("malformed payload for {operation}: {source}")]
    Malformed {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("body error: {0}")]
    Body(#[from] BodyError),

    #[error("crypto error: {0}")]
    Crypto(#[from] EncryptionError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// The message row was deleted while its attachment was downloading.
    #[error("message {0} was removed before its attachment arrived")]
    MessageRemoved(i64),
}
