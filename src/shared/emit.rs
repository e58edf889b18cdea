use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::error::AppResult;
use super::events::HostEvent;

type Listeners = Mutex<Vec<(u64, mpsc::UnboundedSender<HostEvent>)>>;

/// Fan-out of host events to every live subscription.
#[derive(Clone, Default)]
pub struct HostEventBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    listeners: Listeners,
}

/// Receiving end of a bus subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
    rx: mpsc::UnboundedReceiver<HostEvent>,
}

impl HostEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        lock_listeners(&self.inner.listeners).push((id, tx));
        tracing::debug!(subscription = id, "host event subscription opened");

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
            rx,
        }
    }

    /// Deliver an event to all subscribers, pruning any whose receiver is gone.
    pub fn emit(&self, event: HostEvent) {
        let mut listeners = lock_listeners(&self.inner.listeners);
        listeners.retain(|(id, tx)| {
            if tx.send(event.clone()).is_err() {
                tracing::debug!(subscription = *id, "dropping closed subscription");
                false
            } else {
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        lock_listeners(&self.inner.listeners).len()
    }

    /// Emit one event per JSON line until `reader` hits EOF, then drop this
    /// handle. Lines that do not parse as a [`HostEvent`] are skipped.
    ///
    /// Returns how many events were forwarded.
    pub async fn forward_json_lines<R>(self, reader: R) -> AppResult<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut forwarded = 0;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<HostEvent>(line) {
                Ok(event) => {
                    self.emit(event);
                    forwarded += 1;
                }
                Err(e) => tracing::warn!(error = %e, "skipping malformed host event"),
            }
        }

        tracing::debug!(forwarded, "host event stream closed");
        Ok(forwarded)
    }
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<HostEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            lock_listeners(&bus.listeners).retain(|(id, _)| *id != self.id);
            tracing::debug!(subscription = self.id, "host event subscription closed");
        }
    }
}

fn lock_listeners(listeners: &Listeners) -> std::sync::MutexGuard<'_, Vec<(u64, mpsc::UnboundedSender<HostEvent>)>> {
    match listeners.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
