pub mod channel;

pub use channel::*;

use gavel_types::AuctionEvent;

/// Fan-out publisher for canonical snapshot events.
///
/// `broadcast` delivers at-least-once to every current observer; observers
/// treat each event as a full-state replace keyed by lot id, so duplicate
/// or reordered-but-monotonic deliveries are safe. `unicast` delivers a
/// rejection to the originating caller only and is never fanned out.
pub trait Notifier: Send + Sync {
    fn broadcast(&self, event: AuctionEvent);
    fn unicast(&self, caller_id: &str, event: AuctionEvent);
}
