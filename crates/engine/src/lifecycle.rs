//! Lot lifecycle transitions.
//!
//! `Unsold` is initial, `Sold` is terminal, `InAuction` is the single live
//! state. All status changes pass through [`validate_transition`]; call
//! sites never re-check status ad hoc.

use gavel_types::{AuctionError, Lot, LotStatus};

/// Validate that `lot` may move to `target`.
///
/// Activation accepts any lot that is not sold (re-activating the current
/// in-auction lot is an idempotent no-op at this level). A sale requires a
/// live auction. Marking unsold requires a live auction with no recorded
/// bids: once a lot is contested, the only way to close it is a sale.
pub fn validate_transition(lot: &Lot, target: LotStatus) -> Result<(), AuctionError> {
    use LotStatus::*;

    match (lot.status, target) {
        (Sold, InAuction) => Err(AuctionError::Conflict(format!(
            "lot {} already sold",
            lot.id
        ))),
        (_, InAuction) => Ok(()),

        (InAuction, Sold) => Ok(()),
        (_, Sold) => Err(AuctionError::Conflict(format!(
            "lot {} is not in auction",
            lot.id
        ))),

        (InAuction, Unsold) if lot.bid_history.is_empty() => Ok(()),
        (InAuction, Unsold) => Err(AuctionError::Conflict(format!(
            "lot {} has {} recorded bids and cannot be marked unsold",
            lot.id,
            lot.bid_history.len()
        ))),
        (_, Unsold) => Err(AuctionError::Conflict(format!(
            "lot {} is not in auction",
            lot.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_types::BidEntry;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn lot_with_status(status: LotStatus) -> Lot {
        let mut lot = Lot::new("Lamp", "furniture", Decimal::from_str("5.0").unwrap());
        lot.status = status;
        lot
    }

    #[test]
    fn test_unsold_lot_can_enter_auction() {
        let lot = lot_with_status(LotStatus::Unsold);
        assert!(validate_transition(&lot, LotStatus::InAuction).is_ok());
    }

    #[test]
    fn test_sold_lot_cannot_reenter_auction() {
        let lot = lot_with_status(LotStatus::Sold);
        assert!(matches!(
            validate_transition(&lot, LotStatus::InAuction),
            Err(AuctionError::Conflict(_))
        ));
    }

    #[test]
    fn test_only_live_lot_can_sell() {
        let live = lot_with_status(LotStatus::InAuction);
        assert!(validate_transition(&live, LotStatus::Sold).is_ok());

        let idle = lot_with_status(LotStatus::Unsold);
        assert!(matches!(
            validate_transition(&idle, LotStatus::Sold),
            Err(AuctionError::Conflict(_))
        ));
    }

    #[test]
    fn test_mark_unsold_requires_empty_history() {
        let mut lot = lot_with_status(LotStatus::InAuction);
        assert!(validate_transition(&lot, LotStatus::Unsold).is_ok());

        lot.bid_history.push(BidEntry::new(
            "team_a",
            Decimal::from_str("5.0").unwrap(),
        ));
        assert!(matches!(
            validate_transition(&lot, LotStatus::Unsold),
            Err(AuctionError::Conflict(_))
        ));
    }

    #[test]
    fn test_sold_is_terminal() {
        let lot = lot_with_status(LotStatus::Sold);
        assert!(validate_transition(&lot, LotStatus::Unsold).is_err());
        assert!(validate_transition(&lot, LotStatus::Sold).is_err());
        assert!(validate_transition(&lot, LotStatus::InAuction).is_err());
    }
}
