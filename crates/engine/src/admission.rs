//! Bid admissibility.
//!
//! Checks run in a fixed order so every rejection is specific: caller role,
//! team assignment, self-raise guard, then budget against the computed
//! amount. The "some lot must be live" check happens in the orchestrator,
//! which owns the lookup.

use gavel_types::{AuctionError, BidFingerprint, CallerClaims, Lot, Role, Team};
use rust_decimal::Decimal;

use crate::ratchet;

/// A bid the engine is willing to attempt: the server-computed amount plus
/// the observed-state fingerprint the conditional write must match.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissibleBid {
    pub team_id: String,
    pub amount: Decimal,
    pub expected: BidFingerprint,
}

/// Role and team-assignment checks that need no lot state. Returns the
/// bidding team id on success.
pub fn check_caller(claims: &CallerClaims) -> Result<String, AuctionError> {
    if claims.role != Role::Captain {
        return Err(AuctionError::Authorization(
            "only team captains may bid".into(),
        ));
    }
    claims
        .team_id
        .clone()
        .ok_or_else(|| AuctionError::Validation("caller has no team assignment".into()))
}

/// Full admissibility chain for a bid by the caller's team on `lot`.
///
/// `team` must be the record for the caller's claimed team; the orchestrator
/// resolves it before calling in.
pub fn admit_bid(
    claims: &CallerClaims,
    lot: &Lot,
    team: &Team,
) -> Result<AdmissibleBid, AuctionError> {
    let team_id = check_caller(claims)?;

    if lot.leading_team_id() == Some(team_id.as_str()) {
        return Err(AuctionError::Conflict(
            "team already holds the leading bid".into(),
        ));
    }

    let amount = ratchet::admissible_amount(lot)?;
    if !team.can_afford(amount) {
        return Err(AuctionError::InsufficientFunds {
            budget: team.budget,
            required: amount,
        });
    }

    Ok(AdmissibleBid {
        team_id,
        amount,
        expected: BidFingerprint::capture(lot),
    })
}
