//! Channel-backed notifier.
//!
//! One `tokio::sync::broadcast` channel carries the fan-out stream the
//! external pub/sub transport subscribes to; a per-caller registry of
//! unbounded senders carries rejections back to individual bidders.

use std::collections::HashMap;
use std::sync::RwLock;

use gavel_types::AuctionEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::Notifier;

const DEFAULT_CAPACITY: usize = 1000;

pub struct ChannelNotifier {
    fanout: broadcast::Sender<AuctionEvent>,
    callers: RwLock<HashMap<String, mpsc::UnboundedSender<AuctionEvent>>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (fanout, _) = broadcast::channel(capacity);
        Self {
            fanout,
            callers: RwLock::new(HashMap::new()),
        }
    }

    /// New fan-out observer. A lagging receiver misses events rather than
    /// blocking publishers; it re-syncs from the next full snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.fanout.subscribe()
    }

    /// Register a caller for direct rejection delivery. Re-registering the
    /// same caller replaces the previous channel.
    pub fn register_caller(
        &self,
        caller_id: impl Into<String>,
    ) -> mpsc::UnboundedReceiver<AuctionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.write_callers().insert(caller_id.into(), tx);
        rx
    }

    pub fn drop_caller(&self, caller_id: &str) {
        self.write_callers().remove(caller_id);
    }

    fn write_callers(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, mpsc::UnboundedSender<AuctionEvent>>> {
        match self.callers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ChannelNotifier {
    fn broadcast(&self, event: AuctionEvent) {
        // No subscribers is not an error.
        let _ = self.fanout.send(event);
    }

    fn unicast(&self, caller_id: &str, event: AuctionEvent) {
        let callers = match self.callers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match callers.get(caller_id) {
            // A disconnected caller simply misses its rejection.
            Some(tx) => {
                let _ = tx.send(event);
            }
            None => debug!(caller = %caller_id, "no unicast channel registered"),
        }
    }
}
