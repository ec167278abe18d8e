//! Event fan-out for the in-memory directory.

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::task::{Context, Poll};

use chrono::{SecondsFormat, Utc};
use futures_util::Stream;
use tokio::sync::mpsc;
use tracing::debug;

use abook_core::{Change, DirectoryEvent, Result};

#[derive(Debug, Default)]
struct Subscribers {
    seq: u64,
    senders: Vec<mpsc::UnboundedSender<DirectoryEvent>>,
}

/// Delivers every change to every live subscriber, in emission order.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    inner: Mutex<Subscribers>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stamp a change and queue it for all subscribers.
    ///
    /// Subscribers whose stream was dropped are pruned here.
    pub(crate) fn publish(&self, change: Change) {
        let mut subscribers = self.lock();
        subscribers.seq += 1;
        let event = DirectoryEvent {
            seq: subscribers.seq,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            change,
        };
        debug!(
            seq = event.seq,
            change = event.change.name(),
            subscribers = subscribers.senders.len(),
            "Publishing event"
        );
        subscribers
            .senders
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<DirectoryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().senders.push(tx);
        rx
    }
}

/// Change notifications from an in-memory [`Directory`](crate::Directory).
pub struct DirectoryEvents {
    inner: Pin<Box<dyn Stream<Item = Result<DirectoryEvent>> + Send>>,
}

impl DirectoryEvents {
    pub(crate) fn from_bus(bus: &EventBus) -> Self {
        let mut rx = bus.subscribe();

        let stream = async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield Ok(event);
            }
        };

        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for DirectoryEvents {
    type Item = Result<DirectoryEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut events = DirectoryEvents::from_bus(&bus);

        bus.publish(Change::ReadyChanged { ready: true });
        bus.publish(Change::SafeModeChanged { safe_mode: true });

        let first = events.next().await.unwrap().unwrap();
        let second = events.next().await.unwrap().unwrap();
        assert_eq!(first.change.name(), "readyChanged");
        assert_eq!(second.change.name(), "safeModeChanged");
        assert!(first.seq < second.seq);
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        drop(DirectoryEvents::from_bus(&bus));
        let _live = bus.subscribe();

        bus.publish(Change::ReadyChanged { ready: true });
        assert_eq!(bus.lock().senders.len(), 1);
    }
}
