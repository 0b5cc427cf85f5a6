//! # Cost Catalog Lookup
//!
//! Resolves a BOM component to a unit cost.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ComponentKey ──► origin()                                              │
//! │      │                                                                  │
//! │      ├── Slot(s)       ──► selections[s]?  ──► cost of that material    │
//! │      │                          └── none   ──► contributes nothing      │
//! │      │                                                                  │
//! │      └── Accessory(k)  ──► table[k]?       ──► cost of that row         │
//! │                                 └── none   ──► k.default_unit_cost()    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Typed Accessory Table
//! Accessory rows are classified into an [`AccessoryKind`] once, when the
//! table is built. A row whose category equals the kind's canonical category
//! wins; otherwise the first row whose name or category contains the kind's
//! keyword (case-insensitive) is used. Lookups afterwards are a map access.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bom::{AccessoryKind, ComponentKey, CostOrigin, MaterialSelections};
use crate::types::AccessoryCostEntry;

// =============================================================================
// Resolved Cost
// =============================================================================

/// Where a resolved unit cost came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    /// The material picked for the slot.
    Selection,
    /// A row of the accessory table.
    AccessoryTable,
    /// The canonical default for an accessory kind.
    Default,
}

/// A unit cost together with the material it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCost {
    pub unit_cost: Decimal,
    pub material_name: String,
    pub source: CostSource,
}

// =============================================================================
// Accessory Cost Table
// =============================================================================

#[derive(Debug, Clone)]
struct Classified {
    entry: AccessoryCostEntry,
    exact: bool,
}

/// Accessory rows keyed by the component they price.
#[derive(Debug, Clone, Default)]
pub struct AccessoryCostTable {
    by_kind: BTreeMap<AccessoryKind, Classified>,
}

impl AccessoryCostTable {
    /// Builds the table from raw accessory rows, in table order.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::{AccessoryCostEntry, AccessoryCostTable, AccessoryKind};
    /// use rust_decimal_macros::dec;
    ///
    /// let rows = vec![
    ///     AccessoryCostEntry::new("Pata niveladora 10cm", "Herrajes", dec!(12.5)).unwrap(),
    ///     AccessoryCostEntry::new("Clip para zoclo", "clip_patas", dec!(1.8)).unwrap(),
    /// ];
    /// let table = AccessoryCostTable::from_entries(rows);
    ///
    /// assert_eq!(table.get(AccessoryKind::Patas).map(|e| e.unit_cost), Some(dec!(12.5)));
    /// assert!(table.get(AccessoryKind::Cif).is_none());
    /// ```
    pub fn from_entries(entries: impl IntoIterator<Item = AccessoryCostEntry>) -> Self {
        let mut by_kind: BTreeMap<AccessoryKind, Classified> = BTreeMap::new();

        for entry in entries {
            let category = entry.category.trim().to_lowercase();
            let name = entry.name.to_lowercase();

            // A canonical category pins the row to that one kind.
            let exact_kind = AccessoryKind::ALL
                .into_iter()
                .find(|kind| category == kind.category());
            let kinds: Vec<AccessoryKind> = match exact_kind {
                Some(kind) => vec![kind],
                None => AccessoryKind::ALL
                    .into_iter()
                    .filter(|kind| {
                        category.contains(kind.keyword()) || name.contains(kind.keyword())
                    })
                    .collect(),
            };
            let exact = exact_kind.is_some();

            for kind in kinds {
                // First keyword match wins, an exact category beats a keyword.
                let replace = match by_kind.get(&kind) {
                    None => true,
                    Some(current) => exact && !current.exact,
                };
                if replace {
                    by_kind.insert(
                        kind,
                        Classified {
                            entry: entry.clone(),
                            exact,
                        },
                    );
                }
            }
        }

        AccessoryCostTable { by_kind }
    }

    /// The row pricing an accessory kind, if any.
    pub fn get(&self, kind: AccessoryKind) -> Option<&AccessoryCostEntry> {
        self.by_kind.get(&kind).map(|c| &c.entry)
    }

    /// Unit cost for an accessory kind, falling back to its default.
    pub fn resolve(&self, kind: AccessoryKind) -> ResolvedCost {
        match self.get(kind) {
            Some(entry) => ResolvedCost {
                unit_cost: entry.unit_cost,
                material_name: entry.name.clone(),
                source: CostSource::AccessoryTable,
            },
            None => ResolvedCost {
                unit_cost: kind.default_unit_cost(),
                material_name: format!("{} (default)", kind),
                source: CostSource::Default,
            },
        }
    }
}

impl FromIterator<AccessoryCostEntry> for AccessoryCostTable {
    fn from_iter<I: IntoIterator<Item = AccessoryCostEntry>>(iter: I) -> Self {
        AccessoryCostTable::from_entries(iter)
    }
}

// =============================================================================
// Lookup
// =============================================================================

/// Resolves the unit cost of one BOM component.
///
/// Returns `None` for an explicit slot with no material selected: the
/// component contributes nothing, which is not an error.
pub fn resolve_unit_cost(
    key: ComponentKey,
    selections: &MaterialSelections,
    accessories: &AccessoryCostTable,
) -> Option<ResolvedCost> {
    match key.origin() {
        CostOrigin::Slot(slot) => selections.get(slot).map(|material| ResolvedCost {
            unit_cost: material.unit_cost,
            material_name: material.name.clone(),
            source: CostSource::Selection,
        }),
        CostOrigin::Accessory(kind) => Some(accessories.resolve(kind)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::MaterialSlot;
    use crate::types::{MaterialKind, MaterialSelection};
    use rust_decimal_macros::dec;

    fn row(name: &str, category: &str, cost: Decimal) -> AccessoryCostEntry {
        AccessoryCostEntry::new(name, category, cost).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let table = AccessoryCostTable::default();
        assert_eq!(table.resolve(AccessoryKind::Patas).unit_cost, dec!(10));
        assert_eq!(table.resolve(AccessoryKind::ClipPatas).unit_cost, dec!(2));
        assert_eq!(table.resolve(AccessoryKind::Mensulas).unit_cost, dec!(0.90));
        assert_eq!(table.resolve(AccessoryKind::KitTornillo).unit_cost, dec!(30));
        assert_eq!(table.resolve(AccessoryKind::Cif).unit_cost, dec!(100));
        assert_eq!(table.resolve(AccessoryKind::Cif).source, CostSource::Default);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_on_name_or_category() {
        let table = AccessoryCostTable::from_entries(vec![
            row("PATA Cromada", "Herrajes", dec!(15)),
            row("Soporte", "MÉNSULAS", dec!(8)),
            row("Tornillería", "Kit Tornillo 50pz", dec!(28)),
        ]);

        assert_eq!(table.resolve(AccessoryKind::Patas).unit_cost, dec!(15));
        assert_eq!(table.resolve(AccessoryKind::KitTornillo).unit_cost, dec!(28));
        // "MÉNSULAS" lowercases to "ménsulas", which does not contain "mensul".
        assert_eq!(
            table.resolve(AccessoryKind::Mensulas).source,
            CostSource::Default
        );
    }

    #[test]
    fn test_first_keyword_match_wins() {
        let table = AccessoryCostTable::from_entries(vec![
            row("Pata plástica", "Herrajes", dec!(9)),
            row("Pata aluminio", "Herrajes", dec!(22)),
        ]);
        let resolved = table.resolve(AccessoryKind::Patas);
        assert_eq!(resolved.unit_cost, dec!(9));
        assert_eq!(resolved.material_name, "Pata plástica");
        assert_eq!(resolved.source, CostSource::AccessoryTable);
    }

    #[test]
    fn test_exact_category_beats_earlier_keyword_match() {
        let table = AccessoryCostTable::from_entries(vec![
            row("Pata plástica", "Herrajes", dec!(9)),
            row("Pata estándar", "patas", dec!(11)),
        ]);
        assert_eq!(table.resolve(AccessoryKind::Patas).unit_cost, dec!(11));
    }

    #[test]
    fn test_canonical_category_does_not_leak_into_other_kinds() {
        // "clip_patas" contains "pata" but is pinned to ClipPatas.
        let table = AccessoryCostTable::from_entries(vec![
            row("Clip zoclo", "clip_patas", dec!(1.5)),
            row("Pata plástica", "Herrajes", dec!(9)),
        ]);
        assert_eq!(table.resolve(AccessoryKind::ClipPatas).unit_cost, dec!(1.5));
        assert_eq!(table.resolve(AccessoryKind::Patas).unit_cost, dec!(9));
    }

    #[test]
    fn test_resolve_unit_cost_slots() {
        let selections = MaterialSelections::new()
            .with(
                MaterialSlot::MatHuacal,
                MaterialSelection::new(7, "MDF 15mm", dec!(120), MaterialKind::Tablero).unwrap(),
            )
            .unwrap();
        let table = AccessoryCostTable::default();

        let resolved = resolve_unit_cost(ComponentKey::MatHuacal, &selections, &table).unwrap();
        assert_eq!(resolved.unit_cost, dec!(120));
        assert_eq!(resolved.material_name, "MDF 15mm");

        assert!(resolve_unit_cost(ComponentKey::MatVista, &selections, &table).is_none());
        assert!(resolve_unit_cost(ComponentKey::Patas, &selections, &table).is_some());
    }
}
