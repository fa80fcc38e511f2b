use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast message sent to change subscribers after every mutation
#[derive(Clone, Debug)]
pub struct CounterUpdate {
    pub counter: i64,
    pub timestamp: DateTime<Utc>,
}

/// Consistent snapshot of the thing's mutable state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub counter: i64,
    /// None until the first successful action
    pub last_change: Option<DateTime<Utc>>,
}

/// The single piece of mutable domain state: the result counter and the
/// timestamp of its last change.
///
/// All mutation goes through `apply`, which holds the lock for the whole
/// read-modify-write of the pair, so concurrent actions never interleave
/// and readers never observe a half-updated pair.
pub struct ThingState {
    inner: Mutex<CounterSnapshot>,
    change_tx: broadcast::Sender<CounterUpdate>,
}

impl ThingState {
    /// Create state with counter 0 and no recorded change
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(CounterSnapshot {
                counter: 0,
                last_change: None,
            }),
            change_tx,
        }
    }

    /// Current counter and last-change pair
    pub fn read(&self) -> CounterSnapshot {
        self.inner.lock().unwrap().clone()
    }

    /// Atomically apply a signed delta to the counter.
    ///
    /// Records the change timestamp under the same lock and broadcasts the
    /// new value to subscribed change feeds. The broadcast happens inside
    /// the critical section so feed order always matches counter order.
    pub fn apply(&self, delta: i64) -> i64 {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();
        inner.counter += delta;
        inner.last_change = Some(now);

        // Send failure just means no subscriber is connected
        let _ = self.change_tx.send(CounterUpdate {
            counter: inner.counter,
            timestamp: now,
        });

        debug!(delta, counter = inner.counter, "Counter updated");
        inner.counter
    }

    /// Subscribe to counter changes.
    ///
    /// A new receiver only observes changes made after this call; there is
    /// no backlog replay.
    pub fn subscribe(&self) -> broadcast::Receiver<CounterUpdate> {
        self.change_tx.subscribe()
    }
}

impl Default for ThingState {
    fn default() -> Self {
        Self::new()
    }
}
