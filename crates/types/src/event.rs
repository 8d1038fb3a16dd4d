use serde::{Deserialize, Serialize};

use crate::{BidEntry, Lot, Team};

/// Canonical snapshot events published after every accepted transition.
///
/// Delivery is at-least-once fan-out; observers must treat each event as a
/// full-state replace keyed by lot id, never a diff, so duplicated or
/// reordered-but-monotonic deliveries are safe. `BidRejected` is the one
/// exception: it is delivered only to the originating caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum AuctionEvent {
    LotActivated { lot: Lot },
    BidAccepted { lot: Lot, latest: BidEntry },
    BidRejected { reason: String },
    LotSold { lot: Lot, team: Team },
    LotUnsold { lot: Lot },
}
