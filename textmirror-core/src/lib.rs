// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TextMirror Core Library
//!
//! Sync core for mirroring a phone's SMS/MMS history to other devices.
//! Every user-visible field is encrypted client-side before it leaves the
//! device; the server only ever stores ciphertext.
//!
//! Two paths keep a device converged with the server:
//! - bulk sync ([`sync`]) replaces or publishes the whole account,
//! - incremental apply ([`apply`]) folds single push notifications into
//!   the local store, tolerating repeats and reordering.

pub mod account;
pub mod apply;
pub mod attachments;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod model;
pub mod pagination;
pub mod remote;
pub mod storage;
pub mod sync;

pub use account::{AccountContext, AccountError};
pub use apply::{
    ApplyError, ApplyOutcome, ChangeApplier, NoOpReason, Notification, Operation, PendingMedia,
};
pub use attachments::{AttachmentError, AttachmentTransfer, DownloadedFile, TransferReport};
pub use config::{ApiConfig, SyncConfig};
pub use crypto::{DecryptionError, EncryptionError, FieldCodec, SymmetricKey};
pub use error::{SyncError, SyncResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, SyncEvent};
pub use model::{
    Blacklist, ColorSet, Contact, Conversation, Draft, Message, MessageType, ScheduledMessage,
    Subscription, SubscriptionType,
};
pub use pagination::{paginate, PageCursor};
#[cfg(feature = "http")]
pub use remote::{HttpBlobStore, HttpRemote};
pub use remote::{
    BlobStore, ContactDirectory, EntityKind, OutboundSender, RemoteApi, TransportError,
};
pub use storage::{Storage, StorageError};
pub use sync::{BulkDownloader, BulkUploader, DownloadReport, SyncEngine, UploadReport};
