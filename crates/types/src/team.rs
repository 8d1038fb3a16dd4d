use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bidding team with a budget and a roster of won lots.
///
/// The engine owns `budget` and `roster`; `name` belongs to the
/// record-management collaborator. `budget` never goes negative: every
/// debit is conditional on sufficiency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,

    pub name: String,

    pub budget: Decimal,

    /// Ids of lots this team has won. A lot id appears here iff the lot is
    /// sold and owned by this team.
    #[serde(default)]
    pub roster: BTreeSet<String>,
}

impl Team {
    pub fn new(name: impl Into<String>, budget: Decimal) -> Self {
        Self {
            id: format!("team_{}", Uuid::new_v4()),
            name: name.into(),
            budget,
            roster: BTreeSet::new(),
        }
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.budget >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_can_afford_boundary() {
        let team = Team::new("Ravens", Decimal::from_str("10").unwrap());
        assert!(team.can_afford(Decimal::from_str("10").unwrap()));
        assert!(!team.can_afford(Decimal::from_str("10.01").unwrap()));
    }
}
