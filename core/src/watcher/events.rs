//! Observable surface of a `Watcher`.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::error::ApiError;
use crate::types::Record;

/// Something the watcher observed.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Bootstrap finished; carries every ingested record.
    Ready(Vec<Record>),
    /// A record not previously cached.
    New(Record),
    /// A cached record came back with different contents.
    Change { previous: Record, current: Record },
    /// A poll failed. The watcher keeps running.
    Error(ApiError),
    /// Bootstrap failed. The watcher is stopped.
    InitializationError(ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    New,
    Change,
    Error,
    InitializationError,
}

impl WatchEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WatchEvent::Ready(_) => EventKind::Ready,
            WatchEvent::New(_) => EventKind::New,
            WatchEvent::Change { .. } => EventKind::Change,
            WatchEvent::Error(_) => EventKind::Error,
            WatchEvent::InitializationError(_) => EventKind::InitializationError,
        }
    }
}

struct Subscriber {
    /// `None` receives everything.
    kinds: Option<Vec<EventKind>>,
    tx: mpsc::UnboundedSender<WatchEvent>,
}

/// Fan-out of watcher events to any number of subscribers.
#[derive(Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self, kinds: Option<&[EventKind]>) -> mpsc::UnboundedReceiver<WatchEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                kinds: kinds.map(<[EventKind]>::to_vec),
                tx,
            });
        rx
    }

    /// Deliver `event` to interested subscribers, pruning closed ones.
    pub(crate) fn emit(&self, event: WatchEvent) {
        let kind = event.kind();
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sub| {
            let wanted = sub.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind));
            !wanted || sub.tx.send(event.clone()).is_ok()
        });
    }
}
