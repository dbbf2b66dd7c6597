// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for sync events the host application reacts to (refreshing a
//! conversation view, cancelling a notification, re-authenticating).

use std::sync::Arc;

use crate::storage::SettingValue;

/// Events emitted by the sync core.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A message's content is available locally.
    ///
    /// Fired after a deferred attachment download has rewritten `data`.
    MessageAvailable {
        conversation_id: i64,
        message_id: i64,
    },

    /// A message row was inserted or changed by a remote operation.
    MessageChanged {
        conversation_id: i64,
        message_id: i64,
    },

    /// A conversation was inserted, updated or removed remotely.
    ConversationChanged {
        conversation_id: i64,
    },

    /// Another device read a conversation.
    ConversationRead {
        conversation_id: i64,
    },

    /// Another device dismissed the notification of a conversation.
    NotificationDismissed {
        conversation_id: Option<i64>,
    },

    /// The primary device of the account changed.
    PrimaryDeviceChanged {
        is_primary: bool,
    },

    /// A synced setting changed.
    SettingUpdated {
        key: String,
        value: SettingValue,
    },

    /// The account was removed or wiped on another device.
    AccountRemoved,

    /// A full resync finished.
    BulkDownloadFinished {
        messages: usize,
        conversations: usize,
    },
}

/// Receives [`SyncEvent`]s. Called on whichever thread applied the change.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: SyncEvent);
}

/// Adapts a closure into an [`EventHandler`].
pub struct CallbackHandler<F>(F);

impl<F: Fn(SyncEvent) + Send + Sync> CallbackHandler<F> {
    pub fn new(callback: F) -> Self {
        CallbackHandler(callback)
    }
}

impl<F: Fn(SyncEvent) + Send + Sync> EventHandler for CallbackHandler<F> {
    fn on_event(&self, event: SyncEvent) {
        (self.0)(event)
    }
}

/// Fans each event out to the registered handlers, in registration order.
///
/// Cloning is cheap; clones share the handlers registered so far.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Builder form of [`add_handler`](Self::add_handler).
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.add_handler(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn dispatch(&self, event: SyncEvent) {
        tracing::trace!(?event, handlers = self.handlers.len(), "sync event");
        if let Some((last, rest)) = self.handlers.split_last() {
            for handler in rest {
                handler.on_event(event.clone());
            }
            last.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_dispatch_reaches_every_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        for _ in 0..2 {
            let seen = seen.clone();
            dispatcher.add_handler(Arc::new(CallbackHandler::new(move |e| seen.lock().push(e))));
        }

        dispatcher.dispatch(SyncEvent::AccountRemoved);

        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_dispatch_without_handlers_is_silent() {
        let dispatcher = EventDispatcher::new();
        dispatcher.dispatch(SyncEvent::AccountRemoved);
        assert_eq!(dispatcher.handler_count(), 0);
    }

    #[test]
    fn test_with_handler_preserves_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = seen.clone();
        let second = seen.clone();
        let dispatcher = EventDispatcher::new()
            .with_handler(Arc::new(CallbackHandler::new(move |_| first.lock().push(1))))
            .with_handler(Arc::new(CallbackHandler::new(move |_| second.lock().push(2))));

        dispatcher.dispatch(SyncEvent::PrimaryDeviceChanged { is_primary: true });

        assert_eq!(*seen.lock(), vec![1, 2]);
    }
}
