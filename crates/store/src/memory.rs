//! In-memory store implementation.
//!
//! Both aggregates live behind one `RwLock`, so the transactional sale path
//! is genuinely atomic and every conditional write holds the lock for the
//! whole check-then-apply step. Construct with
//! [`MemoryStore::without_transactions`] to model a backend that cannot
//! span both aggregates in one transaction and force the saga path.

use std::collections::HashMap;

use async_trait::async_trait;
use gavel_types::{BidEntry, BidFingerprint, Lot, LotStatus, Team};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{AuctionStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    lots: HashMap<String, Lot>,
    teams: HashMap<String, Team>,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
    transactional: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            transactional: true,
        }
    }

    /// A store without multi-aggregate transactions; sales must run as a
    /// compensated saga.
    pub fn without_transactions() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            transactional: false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn lot(&self, id: &str) -> StoreResult<Option<Lot>> {
        let inner = self.inner.read().await;
        Ok(inner.lots.get(id).cloned())
    }

    async fn team(&self, id: &str) -> StoreResult<Option<Team>> {
        let inner = self.inner.read().await;
        Ok(inner.teams.get(id).cloned())
    }

    async fn lots_in_auction(&self) -> StoreResult<Vec<Lot>> {
        let inner = self.inner.read().await;
        Ok(inner
            .lots
            .values()
            .filter(|l| l.status == LotStatus::InAuction)
            .cloned()
            .collect())
    }

    async fn insert_lot(&self, lot: &Lot) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.lots.contains_key(&lot.id) {
            return Err(StoreError::DuplicateKey(lot.id.clone()));
        }
        inner.lots.insert(lot.id.clone(), lot.clone());
        Ok(())
    }

    async fn insert_team(&self, team: &Team) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.teams.contains_key(&team.id) {
            return Err(StoreError::DuplicateKey(team.id.clone()));
        }
        inner.teams.insert(team.id.clone(), team.clone());
        Ok(())
    }

    async fn activate_exclusive(&self, lot_id: &str) -> StoreResult<(Lot, Vec<Lot>)> {
        let mut inner = self.inner.write().await;

        // Check the target before demoting anything, so failure has no effect.
        match inner.lots.get(lot_id) {
            None => return Err(StoreError::NotFound(lot_id.to_string())),
            Some(lot) if lot.status == LotStatus::Sold => {
                return Err(StoreError::Precondition(format!(
                    "lot {lot_id} already sold"
                )));
            }
            Some(_) => {}
        }

        let mut demoted = Vec::new();
        for (id, lot) in inner.lots.iter_mut() {
            if id != lot_id && lot.status == LotStatus::InAuction {
                lot.status = LotStatus::Unsold;
                demoted.push(lot.clone());
            }
        }

        let lot = inner
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| StoreError::NotFound(lot_id.to_string()))?;
        lot.status = LotStatus::InAuction;
        Ok((lot.clone(), demoted))
    }

    async fn append_bid(
        &self,
        lot_id: &str,
        expected: BidFingerprint,
        entry: BidEntry,
    ) -> StoreResult<Lot> {
        let mut inner = self.inner.write().await;
        let lot = inner
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| StoreError::NotFound(lot_id.to_string()))?;

        if lot.status != LotStatus::InAuction {
            return Err(StoreError::Precondition(format!(
                "lot {lot_id} is no longer in auction"
            )));
        }

        let observed = BidFingerprint::capture(lot);
        if observed != expected {
            debug!(
                lot = %lot_id,
                expected_len = expected.history_len,
                observed_len = observed.history_len,
                "conditional bid write rejected"
            );
            return Err(StoreError::Precondition(format!(
                "bid state changed for lot {lot_id}"
            )));
        }

        lot.bid_history.push(entry);
        Ok(lot.clone())
    }

    async fn mark_unsold(&self, lot_id: &str) -> StoreResult<Lot> {
        let mut inner = self.inner.write().await;
        let lot = inner
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| StoreError::NotFound(lot_id.to_string()))?;

        if lot.status != LotStatus::InAuction {
            return Err(StoreError::Precondition(format!(
                "lot {lot_id} is not in auction"
            )));
        }
        // Guarded here as well as in the engine: a bid may land between the
        // orchestrator's read and this write.
        if !lot.bid_history.is_empty() {
            return Err(StoreError::Precondition(format!(
                "lot {lot_id} has recorded bids"
            )));
        }

        lot.status = LotStatus::Unsold;
        Ok(lot.clone())
    }

    async fn mark_sold(
        &self,
        lot_id: &str,
        team_id: &str,
        final_price: Decimal,
    ) -> StoreResult<Lot> {
        let mut inner = self.inner.write().await;
        let lot = inner
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| StoreError::NotFound(lot_id.to_string()))?;

        if lot.status != LotStatus::InAuction {
            return Err(StoreError::Precondition(format!(
                "lot {lot_id} is not in auction"
            )));
        }

        lot.status = LotStatus::Sold;
        lot.final_price = Some(final_price);
        lot.owner_team_id = Some(team_id.to_string());
        Ok(lot.clone())
    }

    async fn settle_team(
        &self,
        team_id: &str,
        amount: Decimal,
        lot_id: &str,
    ) -> StoreResult<Team> {
        let mut inner = self.inner.write().await;
        let team = inner
            .teams
            .get_mut(team_id)
            .ok_or_else(|| StoreError::NotFound(team_id.to_string()))?;

        if team.budget < amount {
            return Err(StoreError::Precondition(format!(
                "budget of team {team_id} no longer covers {amount}"
            )));
        }

        team.budget -= amount;
        team.roster.insert(lot_id.to_string());
        Ok(team.clone())
    }

    async fn unsettle_team(
        &self,
        team_id: &str,
        amount: Decimal,
        lot_id: &str,
    ) -> StoreResult<Team> {
        let mut inner = self.inner.write().await;
        let team = inner
            .teams
            .get_mut(team_id)
            .ok_or_else(|| StoreError::NotFound(team_id.to_string()))?;

        team.budget += amount;
        team.roster.remove(lot_id);
        Ok(team.clone())
    }

    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    async fn sell_transaction(
        &self,
        lot_id: &str,
        team_id: &str,
        final_price: Decimal,
    ) -> StoreResult<(Lot, Team)> {
        if !self.transactional {
            return Err(StoreError::TransactionsUnavailable);
        }

        let mut inner = self.inner.write().await;

        // Validate everything before touching anything.
        match inner.lots.get(lot_id) {
            None => return Err(StoreError::NotFound(lot_id.to_string())),
            Some(lot) if lot.status != LotStatus::InAuction => {
                return Err(StoreError::Precondition(format!(
                    "lot {lot_id} is not in auction"
                )));
            }
            Some(_) => {}
        }
        match inner.teams.get(team_id) {
            None => return Err(StoreError::NotFound(team_id.to_string())),
            Some(team) if team.budget < final_price => {
                return Err(StoreError::Precondition(format!(
                    "budget of team {team_id} no longer covers {final_price}"
                )));
            }
            Some(_) => {}
        }

        let lot = {
            let lot = inner
                .lots
                .get_mut(lot_id)
                .ok_or_else(|| StoreError::NotFound(lot_id.to_string()))?;
            lot.status = LotStatus::Sold;
            lot.final_price = Some(final_price);
            lot.owner_team_id = Some(team_id.to_string());
            lot.clone()
        };

        let team = {
            let team = inner
                .teams
                .get_mut(team_id)
                .ok_or_else(|| StoreError::NotFound(team_id.to_string()))?;
            team.budget -= final_price;
            team.roster.insert(lot_id.to_string());
            team.clone()
        };

        Ok((lot, team))
    }
}
