//! # Discrepancy Checker
//!
//! Compares a stored price with a fresh recomputation.
//!
//! A stored price can come from an earlier catalog state or a manual override.
//! This module only reports drift for human review; it never corrects the
//! stored value, and a drift is never an error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bom::{FurnitureBom, MaterialSelections};
use crate::catalog::AccessoryCostTable;
use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::{price_breakdown, PriceComponent};
use crate::types::ProjectType;

/// Largest difference, in cents, still treated as "same price".
pub const DISCREPANCY_TOLERANCE_CENTS: i64 = 1;

/// Result of re-pricing a stored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancyReport {
    pub stored: Money,
    pub calculated: Money,
    /// `calculated - stored`; positive means the item got more expensive.
    pub difference: Money,
    pub has_discrepancy: bool,
    /// Terms of the recomputed price, for the reviewer.
    pub components: Vec<PriceComponent>,
}

impl DiscrepancyReport {
    /// Builds a report from two already-computed prices.
    pub fn from_prices(stored: Money, calculated: Money, components: Vec<PriceComponent>) -> Self {
        let difference = calculated - stored;
        DiscrepancyReport {
            stored,
            calculated,
            difference,
            has_discrepancy: difference.abs().cents() > DISCREPANCY_TOLERANCE_CENTS,
            components,
        }
    }
}

/// Recomputes the price and flags `|calculated - stored| > 0.01`.
///
/// ## Errors
/// Only the errors of [`crate::pricing::compute_price`] (missing project
/// type, negative quantity). A mismatch is reported, not returned as `Err`.
///
/// ## Example
/// ```rust
/// use cotiza_core::*;
///
/// let report = check_discrepancy(
///     Money::from_cents(100),
///     &FurnitureBom::new(),
///     &MaterialSelections::new(),
///     &AccessoryCostTable::default(),
///     Some(ProjectType::Other),
/// ).unwrap();
///
/// assert!(report.calculated.is_zero());
/// assert!(report.has_discrepancy);
/// ```
pub fn check_discrepancy(
    stored: Money,
    bom: &FurnitureBom,
    selections: &MaterialSelections,
    accessories: &AccessoryCostTable,
    project_type: Option<ProjectType>,
) -> CoreResult<DiscrepancyReport> {
    let breakdown = price_breakdown(bom, selections, accessories, project_type)?;
    Ok(DiscrepancyReport::from_prices(
        stored,
        breakdown.total,
        breakdown.components,
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::{ComponentKey, MaterialSlot};
    use crate::error::CoreError;
    use crate::types::{MaterialKind, MaterialSelection};
    use rust_decimal_macros::dec;

    fn inputs() -> (FurnitureBom, MaterialSelections) {
        let bom = FurnitureBom::new()
            .with(ComponentKey::MatHuacal, dec!(2.5))
            .with(ComponentKey::MatVista, dec!(1.2))
            .with(ComponentKey::Patas, dec!(4));
        let selections = MaterialSelections::new()
            .with(
                MaterialSlot::MatHuacal,
                MaterialSelection::new(1, "MDF", dec!(120), MaterialKind::Tablero).unwrap(),
            )
            .unwrap()
            .with(
                MaterialSlot::MatVista,
                MaterialSelection::new(2, "Roble", dec!(150), MaterialKind::Tablero).unwrap(),
            )
            .unwrap();
        (bom, selections)
    }

    fn check(stored_cents: i64) -> DiscrepancyReport {
        let (bom, selections) = inputs();
        check_discrepancy(
            Money::from_cents(stored_cents),
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Residencial),
        )
        .unwrap()
    }

    #[test]
    fn test_matching_price_has_no_discrepancy() {
        let report = check(93600);
        assert_eq!(report.calculated, Money::from_cents(93600));
        assert!(report.difference.is_zero());
        assert!(!report.has_discrepancy);
        assert_eq!(report.components.len(), 3);
    }

    #[test]
    fn test_one_cent_is_within_tolerance() {
        assert!(!check(93599).has_discrepancy);
        assert!(!check(93601).has_discrepancy);
    }

    #[test]
    fn test_beyond_tolerance_is_flagged_both_ways() {
        let cheaper = check(93598);
        assert!(cheaper.has_discrepancy);
        assert_eq!(cheaper.difference.cents(), 2);

        let dearer = check(100000);
        assert!(dearer.has_discrepancy);
        assert_eq!(dearer.difference.cents(), -6400);
    }

    #[test]
    fn test_missing_project_type_is_still_an_error() {
        let (bom, selections) = inputs();
        let err = check_discrepancy(
            Money::from_cents(93600),
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::MissingProjectType));
    }
}
