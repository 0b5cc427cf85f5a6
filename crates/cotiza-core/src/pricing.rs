//! # Price Calculator
//!
//! Derives a furniture item's unit price from its BOM, the selected materials,
//! the accessory table and the project type.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  project_type ──► multiplier (unset → MissingProjectType)               │
//! │                                                                         │
//! │  for key in ComponentKey::ALL:                                          │
//! │      q = bom[key]                 (None / 0 → skip)                     │
//! │      c = resolve_unit_cost(key)   (slot with no material → skip)        │
//! │      subtotal = q × c × multiplier            ◄── exact Decimal         │
//! │                                                                         │
//! │  total = Σ subtotal  ──► Money::from_decimal (2 dp, half away from 0)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function of its arguments: calling it again with
//! the same inputs gives the same cents, no matter how often the UI re-prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bom::{ComponentKey, FurnitureBom, MaterialSelections};
use crate::catalog::{resolve_unit_cost, AccessoryCostTable, CostSource};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::ProjectType;

// =============================================================================
// Price Component
// =============================================================================

/// Audit record of one priced component.
///
/// Diagnostic only: the authoritative number is [`PriceBreakdown::total`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    /// BOM key, e.g. `matHuacal`.
    pub name: String,
    pub material_name: String,
    #[ts(as = "String")]
    pub quantity: Decimal,
    #[ts(as = "String")]
    pub unit_cost: Decimal,
    #[ts(as = "String")]
    pub multiplier: Decimal,
    /// Unrounded `quantity × unit_cost × multiplier`.
    #[ts(as = "String")]
    pub subtotal: Decimal,
    pub source: CostSource,
}

/// All priced components plus the rounded total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub project_type: ProjectType,
    pub components: Vec<PriceComponent>,
    pub total: Money,
}

impl PriceBreakdown {
    /// Sum of the unrounded subtotals.
    pub fn exact_total(&self) -> CoreResult<Decimal> {
        checked_sum(&self.components)
    }
}

fn checked_sum(components: &[PriceComponent]) -> CoreResult<Decimal> {
    components
        .iter()
        .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.subtotal))
        .ok_or_else(|| CoreError::PriceOverflow {
            term: "total".to_string(),
        })
}

// =============================================================================
// Calculation
// =============================================================================

/// Prices a furniture item and keeps every contributing term.
///
/// ## Errors
/// - [`CoreError::MissingProjectType`] if `project_type` is `None`
/// - [`CoreError::Validation`] if a BOM quantity is negative
/// - [`CoreError::PriceOverflow`] if a term or the total leaves the
///   representable range
pub fn price_breakdown(
    bom: &FurnitureBom,
    selections: &MaterialSelections,
    accessories: &AccessoryCostTable,
    project_type: Option<ProjectType>,
) -> CoreResult<PriceBreakdown> {
    let project_type = project_type.ok_or(CoreError::MissingProjectType)?;
    bom.validate()?;

    let multiplier = project_type.multiplier().factor();
    let mut components = Vec::new();

    for key in ComponentKey::ALL {
        let quantity = bom.quantity(key);
        if quantity <= Decimal::ZERO {
            continue;
        }
        let Some(resolved) = resolve_unit_cost(key, selections, accessories) else {
            continue;
        };

        let subtotal = quantity
            .checked_mul(resolved.unit_cost)
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(|| CoreError::PriceOverflow {
                term: format!("{} subtotal", key.as_str()),
            })?;

        components.push(PriceComponent {
            name: key.as_str().to_string(),
            material_name: resolved.material_name,
            quantity,
            unit_cost: resolved.unit_cost,
            multiplier,
            subtotal,
            source: resolved.source,
        });
    }

    let exact = checked_sum(&components)?;

    Ok(PriceBreakdown {
        project_type,
        components,
        total: Money::from_decimal(exact)?,
    })
}

/// Computes the unit price of a furniture item.
///
/// ## Example
/// ```rust
/// use cotiza_core::*;
/// use rust_decimal_macros::dec;
///
/// let bom = FurnitureBom::new()
///     .with(ComponentKey::MatHuacal, dec!(2.5))
///     .with(ComponentKey::MatVista, dec!(1.2))
///     .with(ComponentKey::Patas, dec!(4));
/// let selections = MaterialSelections::new()
///     .with(MaterialSlot::MatHuacal,
///           MaterialSelection::new(1, "MDF 15mm", dec!(120), MaterialKind::Tablero).unwrap())
///     .unwrap()
///     .with(MaterialSlot::MatVista,
///           MaterialSelection::new(2, "Melamina roble", dec!(150), MaterialKind::Tablero).unwrap())
///     .unwrap();
///
/// let price = compute_price(
///     &bom,
///     &selections,
///     &AccessoryCostTable::default(),
///     Some(ProjectType::Residencial),
/// ).unwrap();
///
/// // 2.5×120×1.8 + 1.2×150×1.8 + 4×10×1.8 = 540 + 324 + 72
/// assert_eq!(price, Money::from_cents(93600));
/// ```
pub fn compute_price(
    bom: &FurnitureBom,
    selections: &MaterialSelections,
    accessories: &AccessoryCostTable,
    project_type: Option<ProjectType>,
) -> CoreResult<Money> {
    price_breakdown(bom, selections, accessories, project_type).map(|b| b.total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::MaterialSlot;
    use crate::types::{AccessoryCostEntry, MaterialKind, MaterialSelection};
    use rust_decimal_macros::dec;

    fn material(id: i64, cost: Decimal, kind: MaterialKind) -> MaterialSelection {
        MaterialSelection::new(id, format!("material-{id}"), cost, kind).unwrap()
    }

    fn example_inputs() -> (FurnitureBom, MaterialSelections) {
        let bom = FurnitureBom::new()
            .with(ComponentKey::MatHuacal, dec!(2.5))
            .with(ComponentKey::MatVista, dec!(1.2))
            .with(ComponentKey::Patas, dec!(4));
        let selections = MaterialSelections::new()
            .with(MaterialSlot::MatHuacal, material(1, dec!(120), MaterialKind::Tablero))
            .unwrap()
            .with(MaterialSlot::MatVista, material(2, dec!(150), MaterialKind::Tablero))
            .unwrap();
        (bom, selections)
    }

    /// 2.5×120×1.8 + 1.2×150×1.8 + 4×10×1.8 = 540 + 324 + 72 = 936.00
    #[test]
    fn test_reference_scenario() {
        let (bom, selections) = example_inputs();
        let breakdown = price_breakdown(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Residencial),
        )
        .unwrap();

        assert_eq!(breakdown.total, Money::from_cents(93600));
        let subtotals: Vec<Decimal> = breakdown.components.iter().map(|c| c.subtotal).collect();
        assert_eq!(subtotals, vec![dec!(540), dec!(324), dec!(72)]);
        assert_eq!(breakdown.components[2].source, CostSource::Default);
        assert_eq!(breakdown.exact_total().unwrap(), dec!(936));
    }

    #[test]
    fn test_missing_project_type_fails() {
        let (bom, selections) = example_inputs();
        let err = compute_price(&bom, &selections, &AccessoryCostTable::default(), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingProjectType));
    }

    #[test]
    fn test_deterministic_and_idempotent() {
        let (bom, selections) = example_inputs();
        let table = AccessoryCostTable::from_entries(vec![AccessoryCostEntry::new(
            "Pata niveladora",
            "patas",
            dec!(13.33),
        )
        .unwrap()]);

        let first = compute_price(&bom, &selections, &table, Some(ProjectType::Desarrollo)).unwrap();
        for _ in 0..100 {
            let again =
                compute_price(&bom, &selections, &table, Some(ProjectType::Desarrollo)).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_zero_null_and_unselected_contribute_nothing() {
        let (mut bom, selections) = example_inputs();
        let table = AccessoryCostTable::default();
        let base = compute_price(&bom, &selections, &table, Some(ProjectType::Other)).unwrap();

        // Quantity on a slot with no material.
        bom.set(ComponentKey::Bisagras, Some(dec!(6))).unwrap();
        // Zero quantity on an auto-included component.
        bom.set(ComponentKey::Cif, Some(Decimal::ZERO)).unwrap();
        // Explicit null.
        bom.set(ComponentKey::Mensulas, None).unwrap();

        let after = compute_price(&bom, &selections, &table, Some(ProjectType::Other)).unwrap();
        assert_eq!(after, base);
    }

    #[test]
    fn test_multiplier_scaling() {
        let (bom, selections) = example_inputs();
        let table = AccessoryCostTable::default();

        let other = compute_price(&bom, &selections, &table, Some(ProjectType::Other)).unwrap();
        let residencial =
            compute_price(&bom, &selections, &table, Some(ProjectType::Residencial)).unwrap();

        let scaled = Money::from_decimal(other.to_decimal() * dec!(1.8)).unwrap();
        assert!((scaled - residencial).abs().cents() <= 1);
    }

    #[test]
    fn test_decimal_sum_has_no_float_drift() {
        // 0.1 + 0.2 style terms: 3 × 0.1 + 3 × 0.2 at ×1.0 must be exactly 0.90.
        let bom = FurnitureBom::new()
            .with(ComponentKey::ChapHuacal, dec!(3))
            .with(ComponentKey::ChapVista, dec!(3));
        let selections = MaterialSelections::new()
            .with(MaterialSlot::ChapHuacal, material(1, dec!(0.1), MaterialKind::Cubrecanto))
            .unwrap()
            .with(MaterialSlot::ChapVista, material(2, dec!(0.2), MaterialKind::Cubrecanto))
            .unwrap();

        let breakdown = price_breakdown(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Other),
        )
        .unwrap();
        assert_eq!(breakdown.exact_total().unwrap(), dec!(0.9));
        assert_eq!(breakdown.total.cents(), 90);
    }

    #[test]
    fn test_rounds_once_half_away_from_zero() {
        // 1 × 0.0025 × 1.8 = 0.0045 per term; two terms = 0.009 → 0.01
        let bom = FurnitureBom::new()
            .with(ComponentKey::Jaladera, dec!(1))
            .with(ComponentKey::Corredera, dec!(1));
        let selections = MaterialSelections::new()
            .with(MaterialSlot::Jaladera, material(1, dec!(0.0025), MaterialKind::Jaladera))
            .unwrap()
            .with(MaterialSlot::Corredera, material(2, dec!(0.0025), MaterialKind::Corredera))
            .unwrap();

        let price = compute_price(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Residencial),
        )
        .unwrap();
        assert_eq!(price.cents(), 1);
    }

    #[test]
    fn test_all_auto_included_use_table_then_default() {
        let bom = FurnitureBom::new()
            .with(ComponentKey::Patas, dec!(4))
            .with(ComponentKey::ClipPatas, dec!(4))
            .with(ComponentKey::Mensulas, dec!(2))
            .with(ComponentKey::KitTornillo, dec!(1))
            .with(ComponentKey::Cif, dec!(1));
        let table = AccessoryCostTable::from_entries(vec![
            AccessoryCostEntry::new("Kit tornillo 4x50", "Herrajes", dec!(25)).unwrap(),
        ]);

        let price = compute_price(
            &bom,
            &MaterialSelections::new(),
            &table,
            Some(ProjectType::Other),
        )
        .unwrap();

        // 4×10 + 4×2 + 2×0.90 + 1×25 + 1×100 = 174.80
        assert_eq!(price, Money::from_cents(17480));
    }

    #[test]
    fn test_negative_bom_rejected() {
        let bom = FurnitureBom::new().with(ComponentKey::Patas, dec!(-4));
        let err = compute_price(
            &bom,
            &MaterialSelections::new(),
            &AccessoryCostTable::default(),
            Some(ProjectType::Other),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_empty_bom_is_free() {
        let price = compute_price(
            &FurnitureBom::new(),
            &MaterialSelections::new(),
            &AccessoryCostTable::default(),
            Some(ProjectType::Residencial),
        )
        .unwrap();
        assert!(price.is_zero());
    }

    fn board_line(quantity: Decimal, cost: Decimal) -> (FurnitureBom, MaterialSelections) {
        let bom = FurnitureBom::new().with(ComponentKey::MatHuacal, quantity);
        let selections = MaterialSelections::new()
            .with(MaterialSlot::MatHuacal, material(1, cost, MaterialKind::Tablero))
            .unwrap();
        (bom, selections)
    }

    #[test]
    fn test_term_overflow_is_an_error() {
        // 1e19 × 1e11 × 1.8 is past the 96-bit decimal range.
        let (bom, selections) =
            board_line(Decimal::from(10_000_000_000_000_000_000u64), dec!(100000000000));

        let err = compute_price(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Residencial),
        )
        .unwrap_err();

        match err {
            CoreError::PriceOverflow { term } => assert_eq!(term, "matHuacal subtotal"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        // Each term is 5e28, just inside the range; their sum is not.
        let huge = dec!(500000000000000);
        let bom = FurnitureBom::new()
            .with(ComponentKey::MatHuacal, huge)
            .with(ComponentKey::MatVista, huge);
        let selections = MaterialSelections::new()
            .with(MaterialSlot::MatHuacal, material(1, dec!(100000000000000), MaterialKind::Tablero))
            .unwrap()
            .with(MaterialSlot::MatVista, material(2, dec!(100000000000000), MaterialKind::Tablero))
            .unwrap();

        let err = compute_price(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Other),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PriceOverflow { .. }));
    }

    #[test]
    fn test_total_beyond_cents_range_is_an_error() {
        // 1e20 fits a Decimal but not i64 cents; it must not be clamped.
        let (bom, selections) = board_line(dec!(10000000000), dec!(10000000000));

        let err = compute_price(
            &bom,
            &selections,
            &AccessoryCostTable::default(),
            Some(ProjectType::Other),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PriceOverflow { .. }));
    }
}
