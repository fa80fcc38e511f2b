use crate::state::CounterUpdate;
use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

/// One subscriber's live feed of counter changes.
///
/// Wraps a broadcast receiver and frames each change for the
/// `text/event-stream` wire format. Dropping the feed (or the response
/// body built from it) releases the subscription; nothing per-client
/// outlives the connection.
pub struct ChangeFeed {
    rx: broadcast::Receiver<CounterUpdate>,
}

impl ChangeFeed {
    pub fn new(rx: broadcast::Receiver<CounterUpdate>) -> Self {
        Self { rx }
    }

    /// Infinite stream of wire frames, one per counter change, in change
    /// order.
    ///
    /// A lagged receiver skips the overwritten updates and continues with
    /// the current ones; the stream only ends when the sender side closes.
    pub fn into_frames(self) -> impl Stream<Item = String> {
        BroadcastStream::new(self.rx).filter_map(|update| match update {
            Ok(update) => Some(frame(update.counter)),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Change feed lagged, skipped updates");
                None
            }
        })
    }
}

/// Wire framing for a single change event
fn frame(counter: i64) -> String {
    format!("Result: {}\n\n", counter)
}
