use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single item offered for auction.
///
/// The engine owns `status`, `bid_history`, `final_price` and
/// `owner_team_id`; descriptive attributes (`name`, `category`) belong to
/// the record-management collaborator and are only read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,

    pub name: String,

    pub category: String,

    /// Price the opening bid must equal exactly. Immutable once created.
    pub base_price: Decimal,

    pub status: LotStatus,

    /// Append-only; insertion order is bidding order.
    #[serde(default)]
    pub bid_history: Vec<BidEntry>,

    /// Set only when the lot is sold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Decimal>,

    /// Owning team, set only when the lot is sold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_team_id: Option<String>,
}

impl Lot {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        base_price: Decimal,
    ) -> Self {
        Self {
            id: format!("lot_{}", Uuid::new_v4()),
            name: name.into(),
            category: category.into(),
            base_price,
            status: LotStatus::Unsold,
            bid_history: Vec::new(),
            final_price: None,
            owner_team_id: None,
        }
    }

    /// Team holding the current leading bid, if any.
    pub fn leading_team_id(&self) -> Option<&str> {
        self.bid_history.last().map(|b| b.team_id.as_str())
    }

    /// Amount of the current leading bid, if any.
    pub fn leading_amount(&self) -> Option<Decimal> {
        self.bid_history.last().map(|b| b.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Unsold,
    InAuction,
    Sold,
}

/// One accepted bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidEntry {
    pub team_id: String,
    pub amount: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl BidEntry {
    pub fn new(team_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            team_id: team_id.into(),
            amount,
            placed_at: Utc::now(),
        }
    }
}

/// Observed bid state captured at read time, the compare key for the
/// conditional bid write.
///
/// Two bidders that read the same history produce equal fingerprints, so
/// only one of their writes can land; the loser is rejected outright and
/// must resubmit against the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidFingerprint {
    pub history_len: usize,
    pub top_amount: Decimal,
}

impl BidFingerprint {
    /// History length plus the last bid amount, or the base price while the
    /// history is empty.
    pub fn capture(lot: &Lot) -> Self {
        Self {
            history_len: lot.bid_history.len(),
            top_amount: lot.leading_amount().unwrap_or(lot.base_price),
        }
    }
}
