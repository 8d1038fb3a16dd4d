//! Sale finalization across the lot and team aggregates.
//!
//! A sale moves budget out of a team, attaches the lot to the team's roster
//! and flips the lot to sold. When the storage collaborator can span both
//! aggregates in one transaction, the whole sale is atomic. When it cannot,
//! the sale runs as an explicit two-step saga with a defined compensating
//! action, so the system never ends with money spent and no lot sold, nor a
//! lot sold with an untouched budget.

use std::sync::Arc;

use gavel_engine::lifecycle;
use gavel_store::{AuctionStore, StoreError};
use gavel_types::{AuctionError, Lot, LotStatus, Team};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Which execution strategy completed a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleMode {
    Transaction,
    Saga,
}

/// Both updated aggregates plus the strategy that produced them.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    pub lot: Lot,
    pub team: Team,
    pub mode: SaleMode,
}

/// Settlement tunables.
#[derive(Debug, Clone, Default)]
pub struct SettlementConfig {
    /// Reject a sale whose amount differs from the last recorded bid
    /// instead of trusting the administrator's override.
    pub strict_final_amount: bool,
}

pub struct SettlementCoordinator {
    store: Arc<dyn AuctionStore>,
    config: SettlementConfig,
}

impl SettlementCoordinator {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self::with_config(store, SettlementConfig::default())
    }

    pub fn with_config(store: Arc<dyn AuctionStore>, config: SettlementConfig) -> Self {
        Self { store, config }
    }

    /// Finalize a sale of `lot_id` to `team_id` at `final_amount`.
    ///
    /// The amount is taken as given — it is the latest bid for a normal
    /// hammer sale, or an administrator-confirmed figure for a direct sale —
    /// but budget and lifecycle checks always run.
    pub async fn settle(
        &self,
        lot_id: &str,
        team_id: &str,
        final_amount: Decimal,
    ) -> Result<SaleOutcome, AuctionError> {
        if final_amount.is_sign_negative() {
            return Err(AuctionError::Validation(
                "final amount must not be negative".into(),
            ));
        }

        // Precondition reads. The writes below re-check conditionally; these
        // reads exist to produce specific rejections before any mutation.
        let lot = self
            .store
            .lot(lot_id)
            .await
            .map_err(storage_fault)?
            .ok_or_else(|| AuctionError::not_found("lot", lot_id))?;
        lifecycle::validate_transition(&lot, LotStatus::Sold)?;

        if let Some(last) = lot.leading_amount() {
            if last != final_amount {
                if self.config.strict_final_amount {
                    return Err(AuctionError::Validation(format!(
                        "final amount {final_amount} differs from last recorded bid {last}"
                    )));
                }
                warn!(
                    lot = %lot_id,
                    %last,
                    %final_amount,
                    "sale amount overrides last recorded bid"
                );
            }
        }

        let team = self
            .store
            .team(team_id)
            .await
            .map_err(storage_fault)?
            .ok_or_else(|| AuctionError::not_found("team", team_id))?;
        if !team.can_afford(final_amount) {
            return Err(AuctionError::InsufficientFunds {
                budget: team.budget,
                required: final_amount,
            });
        }

        if self.store.supports_transactions() {
            self.settle_atomic(lot_id, team_id, final_amount).await
        } else {
            self.settle_saga(lot_id, team_id, final_amount).await
        }
    }

    async fn settle_atomic(
        &self,
        lot_id: &str,
        team_id: &str,
        amount: Decimal,
    ) -> Result<SaleOutcome, AuctionError> {
        match self.store.sell_transaction(lot_id, team_id, amount).await {
            Ok((lot, team)) => {
                info!(lot = %lot_id, team = %team_id, %amount, "lot sold (transaction)");
                Ok(SaleOutcome {
                    lot,
                    team,
                    mode: SaleMode::Transaction,
                })
            }
            // The capability probe raced a backend change; the saga still works.
            Err(StoreError::TransactionsUnavailable) => {
                warn!(lot = %lot_id, "transaction path unavailable, falling back to saga");
                self.settle_saga(lot_id, team_id, amount).await
            }
            Err(err) => Err(sale_rejection(err)),
        }
    }

    async fn settle_saga(
        &self,
        lot_id: &str,
        team_id: &str,
        amount: Decimal,
    ) -> Result<SaleOutcome, AuctionError> {
        // ═══════════════════════════════════════════════════════════════════
        // STEP (a): debit the budget and add the roster entry, conditional
        // on the budget still being sufficient
        // ═══════════════════════════════════════════════════════════════════
        let team = self
            .store
            .settle_team(team_id, amount, lot_id)
            .await
            .map_err(sale_rejection)?;

        // ═══════════════════════════════════════════════════════════════════
        // STEP (b): flip the lot to sold, conditional on it still being in
        // auction
        // ═══════════════════════════════════════════════════════════════════
        match self.store.mark_sold(lot_id, team_id, amount).await {
            Ok(lot) => {
                info!(lot = %lot_id, team = %team_id, %amount, "lot sold (saga)");
                Ok(SaleOutcome {
                    lot,
                    team,
                    mode: SaleMode::Saga,
                })
            }
            Err(flip_err) => {
                // ═══════════════════════════════════════════════════════════
                // STEP (c): compensate step (a) before surfacing the conflict
                // ═══════════════════════════════════════════════════════════
                warn!(
                    lot = %lot_id,
                    team = %team_id,
                    error = %flip_err,
                    "lot flip failed after debit, compensating"
                );
                if let Err(comp_err) = self.store.unsettle_team(team_id, amount, lot_id).await {
                    error!(
                        team = %team_id,
                        error = %comp_err,
                        "sale compensation failed, budget and roster need operator attention"
                    );
                    return Err(AuctionError::Invariant(format!(
                        "sale compensation failed for team {team_id}: {comp_err}"
                    )));
                }
                Err(AuctionError::Conflict(
                    "lot state changed during sale, retry".into(),
                ))
            }
        }
    }
}

fn sale_rejection(err: StoreError) -> AuctionError {
    match err {
        StoreError::NotFound(id) => AuctionError::not_found("record", id),
        StoreError::Precondition(msg) => AuctionError::Conflict(msg),
        other => storage_fault(other),
    }
}

fn storage_fault(err: StoreError) -> AuctionError {
    AuctionError::Invariant(format!("storage failure: {err}"))
}
