//! The command façade.
//!
//! Sequences each inbound command through lifecycle validation, the bid
//! ratchet, the conditional-write discipline and settlement, then publishes
//! the new canonical state. Commands run concurrently on independent tasks;
//! the only suspension points are store calls, and no lock is held across a
//! read-compute-write sequence.

use std::sync::Arc;

use gavel_engine::{admission, lifecycle};
use gavel_notifier::Notifier;
use gavel_settlement::{SaleOutcome, SettlementConfig, SettlementCoordinator};
use gavel_store::{AuctionStore, StoreError};
use gavel_types::{
    AuctionError, AuctionEvent, BidEntry, CallerClaims, Lot, LotStatus, Role,
};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Orchestrator tunables.
#[derive(Debug, Clone, Default)]
pub struct AuctioneerConfig {
    pub settlement: SettlementConfig,
}

/// Façade over store, engine, settlement and notifier.
pub struct Auctioneer {
    store: Arc<dyn AuctionStore>,
    notifier: Arc<dyn Notifier>,
    settlement: SettlementCoordinator,
}

impl Auctioneer {
    pub fn new(store: Arc<dyn AuctionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, AuctioneerConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn AuctionStore>,
        notifier: Arc<dyn Notifier>,
        config: AuctioneerConfig,
    ) -> Self {
        Self {
            settlement: SettlementCoordinator::with_config(store.clone(), config.settlement),
            store,
            notifier,
        }
    }

    /// Stale-tolerant snapshot of the lot currently under the hammer, for
    /// display and late-joiner sync.
    pub async fn current_lot(&self) -> Result<Option<Lot>, AuctionError> {
        self.active_lot().await
    }

    /// Open the auction on `lot_id`, demoting any other live lot.
    pub async fn start_auction(
        &self,
        claims: &CallerClaims,
        lot_id: &str,
    ) -> Result<Lot, AuctionError> {
        require_admin(claims)?;

        let lot = self
            .store
            .lot(lot_id)
            .await
            .map_err(storage_fault)?
            .ok_or_else(|| AuctionError::not_found("lot", lot_id))?;
        lifecycle::validate_transition(&lot, LotStatus::InAuction)?;

        if !lot.bid_history.is_empty() {
            // Re-offering a contested lot is undefined behavior per the
            // auction rules; the history is kept, never reset.
            warn!(
                lot = %lot_id,
                bids = lot.bid_history.len(),
                "re-activating a lot that already has bid history"
            );
        }

        let (lot, demoted) = self
            .store
            .activate_exclusive(lot_id)
            .await
            .map_err(|e| lot_rejection(lot_id, e))?;
        info!(lot = %lot.id, name = %lot.name, "lot activated");

        for idle in demoted {
            self.notifier
                .broadcast(AuctionEvent::LotUnsold { lot: idle });
        }
        self.notifier
            .broadcast(AuctionEvent::LotActivated { lot: lot.clone() });
        Ok(lot)
    }

    /// Place a bid on whichever lot is live. The lot is implicit and the
    /// amount is computed server-side; the caller supplies nothing but its
    /// claims. Rejections are answered directly to the caller, never
    /// broadcast.
    pub async fn place_bid(&self, claims: &CallerClaims) -> Result<Lot, AuctionError> {
        match self.try_place_bid(claims).await {
            Ok(lot) => Ok(lot),
            Err(err) => {
                self.notifier.unicast(
                    &claims.caller_id,
                    AuctionEvent::BidRejected {
                        reason: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    async fn try_place_bid(&self, claims: &CallerClaims) -> Result<Lot, AuctionError> {
        let team_id = admission::check_caller(claims)?;

        let lot = self
            .active_lot()
            .await?
            .ok_or_else(|| AuctionError::Conflict("no active lot".into()))?;

        let team = self
            .store
            .team(&team_id)
            .await
            .map_err(storage_fault)?
            .ok_or_else(|| AuctionError::not_found("team", &team_id))?;

        let bid = admission::admit_bid(claims, &lot, &team)?;
        let entry = BidEntry::new(bid.team_id.clone(), bid.amount);

        let updated = match self
            .store
            .append_bid(&lot.id, bid.expected, entry.clone())
            .await
        {
            Ok(lot) => lot,
            // Lost the race: the admissible amount itself may have changed,
            // so the caller must resubmit against the state already
            // broadcast to it.
            Err(StoreError::Precondition(msg)) => {
                debug!(lot = %lot.id, team = %bid.team_id, %msg, "bid lost the race");
                return Err(AuctionError::Conflict(msg));
            }
            Err(err) => return Err(lot_rejection(&lot.id, err)),
        };

        info!(
            lot = %updated.id,
            team = %bid.team_id,
            amount = %bid.amount,
            "bid accepted"
        );
        self.notifier.broadcast(AuctionEvent::BidAccepted {
            lot: updated.clone(),
            latest: entry,
        });
        Ok(updated)
    }

    /// Close the live auction by selling `lot_id` to `team_id`.
    pub async fn sell_lot(
        &self,
        claims: &CallerClaims,
        lot_id: &str,
        team_id: &str,
        final_amount: Decimal,
    ) -> Result<SaleOutcome, AuctionError> {
        require_admin(claims)?;

        let outcome = self.settlement.settle(lot_id, team_id, final_amount).await?;
        self.notifier.broadcast(AuctionEvent::LotSold {
            lot: outcome.lot.clone(),
            team: outcome.team.clone(),
        });
        Ok(outcome)
    }

    /// Close the live auction without a sale. Only possible while no bid
    /// has been recorded.
    pub async fn mark_unsold(
        &self,
        claims: &CallerClaims,
        lot_id: &str,
    ) -> Result<Lot, AuctionError> {
        require_admin(claims)?;

        let lot = self
            .store
            .lot(lot_id)
            .await
            .map_err(storage_fault)?
            .ok_or_else(|| AuctionError::not_found("lot", lot_id))?;
        lifecycle::validate_transition(&lot, LotStatus::Unsold)?;

        let lot = self
            .store
            .mark_unsold(lot_id)
            .await
            .map_err(|e| lot_rejection(lot_id, e))?;
        info!(lot = %lot.id, "lot marked unsold");

        self.notifier
            .broadcast(AuctionEvent::LotUnsold { lot: lot.clone() });
        Ok(lot)
    }

    async fn active_lot(&self) -> Result<Option<Lot>, AuctionError> {
        let mut live = self
            .store
            .lots_in_auction()
            .await
            .map_err(storage_fault)?;
        match live.len() {
            0 | 1 => Ok(live.pop()),
            n => {
                error!(count = n, "multiple lots in auction");
                Err(AuctionError::Invariant(format!(
                    "{n} lots in auction simultaneously"
                )))
            }
        }
    }
}

fn require_admin(claims: &CallerClaims) -> Result<(), AuctionError> {
    if claims.role != Role::Admin {
        return Err(AuctionError::Authorization("admin role required".into()));
    }
    Ok(())
}

fn lot_rejection(lot_id: &str, err: StoreError) -> AuctionError {
    match err {
        StoreError::NotFound(_) => AuctionError::not_found("lot", lot_id),
        StoreError::Precondition(msg) => AuctionError::Conflict(msg),
        other => storage_fault(other),
    }
}

fn storage_fault(err: StoreError) -> AuctionError {
    AuctionError::Invariant(format!("storage failure: {err}"))
}
