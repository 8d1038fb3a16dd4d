//! Tiered bid increments.
//!
//! The amount of the next admissible bid is always computed server-side;
//! callers never choose it.

use gavel_types::{AuctionError, Lot};
use rust_decimal::Decimal;

/// Step size for the price band `current` falls in:
/// below 5 → 0.25, from 5 below 10 → 0.50, from 10 up → 1.
fn increment_for(current: Decimal) -> Decimal {
    if current < Decimal::from(5) {
        Decimal::new(25, 2)
    } else if current < Decimal::from(10) {
        Decimal::new(5, 1)
    } else {
        Decimal::ONE
    }
}

/// Next admissible amount above `current`, rounded to 2 decimal places.
pub fn next_bid(current: Decimal) -> Decimal {
    (current + increment_for(current)).round_dp(2)
}

/// The one amount the engine accepts for the next bid on `lot`: the base
/// price while the history is empty (opening bid, no increment applied),
/// otherwise the ratchet applied to the last recorded amount.
pub fn admissible_amount(lot: &Lot) -> Result<Decimal, AuctionError> {
    let amount = match lot.leading_amount() {
        Some(last) => next_bid(last),
        None => lot.base_price,
    };
    if amount.is_sign_negative() {
        return Err(AuctionError::Validation(format!(
            "computed bid amount {amount} is negative"
        )));
    }
    Ok(amount)
}
