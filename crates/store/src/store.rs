//! The storage contract the engine requires of its persistence
//! collaborator.
//!
//! Reads return stale-tolerant snapshots. Every conditional method either
//! applies its whole mutation or fails with [`StoreError::Precondition`]
//! leaving the record untouched — no partial effect, no merge, no internal
//! retry. A store may additionally offer one atomic cross-aggregate sale
//! transaction; when it does not, the settlement coordinator falls back to
//! a compensated two-step saga.

use async_trait::async_trait;
use gavel_types::{BidEntry, BidFingerprint, Lot, Team};
use rust_decimal::Decimal;

use crate::StoreResult;

#[async_trait]
pub trait AuctionStore: Send + Sync {
    // Snapshot reads
    async fn lot(&self, id: &str) -> StoreResult<Option<Lot>>;
    async fn team(&self, id: &str) -> StoreResult<Option<Team>>;
    async fn lots_in_auction(&self) -> StoreResult<Vec<Lot>>;

    // Seeding (record creation itself belongs to the CRUD collaborator;
    // these exist for fixtures and bootstrap)
    async fn insert_lot(&self, lot: &Lot) -> StoreResult<()>;
    async fn insert_team(&self, team: &Team) -> StoreResult<()>;

    /// Activate `lot_id`, demoting every other in-auction lot to unsold in
    /// the same exclusive update, so at most one lot is ever live. Returns
    /// the activated lot plus the demoted lots. Fails without effect when
    /// the target is missing or already sold.
    async fn activate_exclusive(&self, lot_id: &str) -> StoreResult<(Lot, Vec<Lot>)>;

    /// Append one bid iff the lot is still in auction and its persisted bid
    /// state still matches `expected`.
    async fn append_bid(
        &self,
        lot_id: &str,
        expected: BidFingerprint,
        entry: BidEntry,
    ) -> StoreResult<Lot>;

    /// Flip an in-auction lot with no recorded bids back to unsold.
    async fn mark_unsold(&self, lot_id: &str) -> StoreResult<Lot>;

    /// Flip the lot to sold iff it is still in auction, recording the final
    /// price and owning team. The bid history is left untouched.
    async fn mark_sold(
        &self,
        lot_id: &str,
        team_id: &str,
        final_price: Decimal,
    ) -> StoreResult<Lot>;

    /// Debit `amount` and add `lot_id` to the roster iff the budget is
    /// still sufficient (a CAS on the budget).
    async fn settle_team(
        &self,
        team_id: &str,
        amount: Decimal,
        lot_id: &str,
    ) -> StoreResult<Team>;

    /// Compensating update reversing [`AuctionStore::settle_team`]: restore
    /// the budget and remove the roster entry.
    async fn unsettle_team(
        &self,
        team_id: &str,
        amount: Decimal,
        lot_id: &str,
    ) -> StoreResult<Team>;

    /// Whether [`AuctionStore::sell_transaction`] is available.
    fn supports_transactions(&self) -> bool;

    /// Atomic cross-aggregate sale: lot flipped to sold, budget debited,
    /// roster updated — all or nothing.
    async fn sell_transaction(
        &self,
        lot_id: &str,
        team_id: &str,
        final_price: Decimal,
    ) -> StoreResult<(Lot, Team)>;
}
