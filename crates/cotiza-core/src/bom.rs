//! # Furniture BOM
//!
//! The closed set of priced components of a furniture item and how each one
//! gets its unit cost.
//!
//! ## Component Keys
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Explicit slots (cost from a MaterialSelection)                         │
//! │    matHuacal  matVista  chapHuacal  chapVista                          │
//! │    jaladera   corredera bisagras    tipOnLargo                          │
//! │                                                                         │
//! │  Auto-included (cost from the accessory table, else a default)         │
//! │    patas  clipPatas  mensulas  kitTornillo  cif                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{MaterialKind, MaterialSelection};

// =============================================================================
// Material Slot
// =============================================================================

/// A BOM component priced from a per-quotation material selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum MaterialSlot {
    /// Carcass board.
    MatHuacal,
    /// Visible-face board.
    MatVista,
    /// Carcass edge banding.
    ChapHuacal,
    /// Visible edge banding.
    ChapVista,
    Jaladera,
    Corredera,
    Bisagras,
    /// Long push-to-open mechanism.
    TipOnLargo,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 8] = [
        MaterialSlot::MatHuacal,
        MaterialSlot::MatVista,
        MaterialSlot::ChapHuacal,
        MaterialSlot::ChapVista,
        MaterialSlot::Jaladera,
        MaterialSlot::Corredera,
        MaterialSlot::Bisagras,
        MaterialSlot::TipOnLargo,
    ];

    /// The material kind this slot accepts.
    pub const fn expected_kind(&self) -> MaterialKind {
        match self {
            MaterialSlot::MatHuacal | MaterialSlot::MatVista => MaterialKind::Tablero,
            MaterialSlot::ChapHuacal | MaterialSlot::ChapVista => MaterialKind::Cubrecanto,
            MaterialSlot::Jaladera => MaterialKind::Jaladera,
            MaterialSlot::Corredera => MaterialKind::Corredera,
            MaterialSlot::Bisagras => MaterialKind::Bisagra,
            MaterialSlot::TipOnLargo => MaterialKind::Accesorio,
        }
    }

    pub const fn component(&self) -> ComponentKey {
        match self {
            MaterialSlot::MatHuacal => ComponentKey::MatHuacal,
            MaterialSlot::MatVista => ComponentKey::MatVista,
            MaterialSlot::ChapHuacal => ComponentKey::ChapHuacal,
            MaterialSlot::ChapVista => ComponentKey::ChapVista,
            MaterialSlot::Jaladera => ComponentKey::Jaladera,
            MaterialSlot::Corredera => ComponentKey::Corredera,
            MaterialSlot::Bisagras => ComponentKey::Bisagras,
            MaterialSlot::TipOnLargo => ComponentKey::TipOnLargo,
        }
    }
}

impl fmt::Display for MaterialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component().as_str())
    }
}

// =============================================================================
// Accessory Kind
// =============================================================================

/// A BOM component priced from the shared accessory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum AccessoryKind {
    Patas,
    ClipPatas,
    Mensulas,
    KitTornillo,
    /// Indirect manufacturing cost.
    Cif,
}

impl AccessoryKind {
    pub const ALL: [AccessoryKind; 5] = [
        AccessoryKind::Patas,
        AccessoryKind::ClipPatas,
        AccessoryKind::Mensulas,
        AccessoryKind::KitTornillo,
        AccessoryKind::Cif,
    ];

    /// Canonical category name in the accessory table.
    pub const fn category(&self) -> &'static str {
        match self {
            AccessoryKind::Patas => "patas",
            AccessoryKind::ClipPatas => "clip_patas",
            AccessoryKind::Mensulas => "mensulas",
            AccessoryKind::KitTornillo => "kit_tornillo",
            AccessoryKind::Cif => "cif",
        }
    }

    /// Keyword recognised in free-form accessory names/categories.
    pub const fn keyword(&self) -> &'static str {
        match self {
            AccessoryKind::Patas => "pata",
            AccessoryKind::ClipPatas => "clip",
            AccessoryKind::Mensulas => "mensul",
            AccessoryKind::KitTornillo => "tornillo",
            AccessoryKind::Cif => "cif",
        }
    }

    /// Unit cost used when the accessory table has no entry for this kind.
    ///
    /// This is the only default table; every pricing path goes through it.
    pub fn default_unit_cost(&self) -> Decimal {
        match self {
            AccessoryKind::Patas => dec!(10),
            AccessoryKind::ClipPatas => dec!(2),
            AccessoryKind::Mensulas => dec!(0.90),
            AccessoryKind::KitTornillo => dec!(30),
            AccessoryKind::Cif => dec!(100),
        }
    }

    pub const fn component(&self) -> ComponentKey {
        match self {
            AccessoryKind::Patas => ComponentKey::Patas,
            AccessoryKind::ClipPatas => ComponentKey::ClipPatas,
            AccessoryKind::Mensulas => ComponentKey::Mensulas,
            AccessoryKind::KitTornillo => ComponentKey::KitTornillo,
            AccessoryKind::Cif => ComponentKey::Cif,
        }
    }
}

impl fmt::Display for AccessoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component().as_str())
    }
}

// =============================================================================
// Component Key
// =============================================================================

/// Where a component's unit cost comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostOrigin {
    Slot(MaterialSlot),
    Accessory(AccessoryKind),
}

/// One of the 13 BOM component keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKey {
    MatHuacal,
    MatVista,
    ChapHuacal,
    ChapVista,
    Jaladera,
    Corredera,
    Bisagras,
    Patas,
    ClipPatas,
    Mensulas,
    KitTornillo,
    Cif,
    TipOnLargo,
}

impl ComponentKey {
    /// All keys, in BOM order. Pricing iterates in this order.
    pub const ALL: [ComponentKey; 13] = [
        ComponentKey::MatHuacal,
        ComponentKey::MatVista,
        ComponentKey::ChapHuacal,
        ComponentKey::ChapVista,
        ComponentKey::Jaladera,
        ComponentKey::Corredera,
        ComponentKey::Bisagras,
        ComponentKey::Patas,
        ComponentKey::ClipPatas,
        ComponentKey::Mensulas,
        ComponentKey::KitTornillo,
        ComponentKey::Cif,
        ComponentKey::TipOnLargo,
    ];

    /// The camelCase key as it appears in BOM records.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ComponentKey::MatHuacal => "matHuacal",
            ComponentKey::MatVista => "matVista",
            ComponentKey::ChapHuacal => "chapHuacal",
            ComponentKey::ChapVista => "chapVista",
            ComponentKey::Jaladera => "jaladera",
            ComponentKey::Corredera => "corredera",
            ComponentKey::Bisagras => "bisagras",
            ComponentKey::Patas => "patas",
            ComponentKey::ClipPatas => "clipPatas",
            ComponentKey::Mensulas => "mensulas",
            ComponentKey::KitTornillo => "kitTornillo",
            ComponentKey::Cif => "cif",
            ComponentKey::TipOnLargo => "tipOnLargo",
        }
    }

    pub const fn origin(&self) -> CostOrigin {
        match self {
            ComponentKey::MatHuacal => CostOrigin::Slot(MaterialSlot::MatHuacal),
            ComponentKey::MatVista => CostOrigin::Slot(MaterialSlot::MatVista),
            ComponentKey::ChapHuacal => CostOrigin::Slot(MaterialSlot::ChapHuacal),
            ComponentKey::ChapVista => CostOrigin::Slot(MaterialSlot::ChapVista),
            ComponentKey::Jaladera => CostOrigin::Slot(MaterialSlot::Jaladera),
            ComponentKey::Corredera => CostOrigin::Slot(MaterialSlot::Corredera),
            ComponentKey::Bisagras => CostOrigin::Slot(MaterialSlot::Bisagras),
            ComponentKey::TipOnLargo => CostOrigin::Slot(MaterialSlot::TipOnLargo),
            ComponentKey::Patas => CostOrigin::Accessory(AccessoryKind::Patas),
            ComponentKey::ClipPatas => CostOrigin::Accessory(AccessoryKind::ClipPatas),
            ComponentKey::Mensulas => CostOrigin::Accessory(AccessoryKind::Mensulas),
            ComponentKey::KitTornillo => CostOrigin::Accessory(AccessoryKind::KitTornillo),
            ComponentKey::Cif => CostOrigin::Accessory(AccessoryKind::Cif),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Furniture BOM
// =============================================================================

/// Component quantities of one furniture item.
///
/// `None` and zero both mean "not used". Quantities are never negative; the
/// pricing functions call [`FurnitureBom::validate`] before summing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct FurnitureBom {
    #[ts(as = "Option<String>")]
    pub mat_huacal: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub mat_vista: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub chap_huacal: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub chap_vista: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub jaladera: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub corredera: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub bisagras: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub patas: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub clip_patas: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub mensulas: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub kit_tornillo: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub cif: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub tip_on_largo: Option<Decimal>,
}

impl FurnitureBom {
    /// Creates an empty BOM.
    pub fn new() -> Self {
        FurnitureBom::default()
    }

    /// Builder-style setter.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::{ComponentKey, FurnitureBom};
    /// use rust_decimal_macros::dec;
    ///
    /// let bom = FurnitureBom::new()
    ///     .with(ComponentKey::MatHuacal, dec!(2.5))
    ///     .with(ComponentKey::Patas, dec!(4));
    /// assert_eq!(bom.quantity(ComponentKey::MatHuacal), dec!(2.5));
    /// assert_eq!(bom.quantity(ComponentKey::MatVista), dec!(0));
    /// ```
    pub fn with(mut self, key: ComponentKey, quantity: Decimal) -> Self {
        *self.slot_mut(key) = Some(quantity);
        self
    }

    /// Sets or clears a component quantity, rejecting negative values.
    pub fn set(&mut self, key: ComponentKey, quantity: Option<Decimal>) -> CoreResult<()> {
        if let Some(q) = quantity {
            check_quantity(key, q)?;
        }
        *self.slot_mut(key) = quantity;
        Ok(())
    }

    /// Raw (nullable) quantity of a component.
    pub fn get(&self, key: ComponentKey) -> Option<Decimal> {
        match key {
            ComponentKey::MatHuacal => self.mat_huacal,
            ComponentKey::MatVista => self.mat_vista,
            ComponentKey::ChapHuacal => self.chap_huacal,
            ComponentKey::ChapVista => self.chap_vista,
            ComponentKey::Jaladera => self.jaladera,
            ComponentKey::Corredera => self.corredera,
            ComponentKey::Bisagras => self.bisagras,
            ComponentKey::Patas => self.patas,
            ComponentKey::ClipPatas => self.clip_patas,
            ComponentKey::Mensulas => self.mensulas,
            ComponentKey::KitTornillo => self.kit_tornillo,
            ComponentKey::Cif => self.cif,
            ComponentKey::TipOnLargo => self.tip_on_largo,
        }
    }

    /// Quantity of a component, with `None` read as zero.
    pub fn quantity(&self, key: ComponentKey) -> Decimal {
        self.get(key).unwrap_or(Decimal::ZERO)
    }

    /// Checks every quantity is non-negative.
    pub fn validate(&self) -> CoreResult<()> {
        for key in ComponentKey::ALL {
            if let Some(q) = self.get(key) {
                check_quantity(key, q)?;
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: ComponentKey) -> &mut Option<Decimal> {
        match key {
            ComponentKey::MatHuacal => &mut self.mat_huacal,
            ComponentKey::MatVista => &mut self.mat_vista,
            ComponentKey::ChapHuacal => &mut self.chap_huacal,
            ComponentKey::ChapVista => &mut self.chap_vista,
            ComponentKey::Jaladera => &mut self.jaladera,
            ComponentKey::Corredera => &mut self.corredera,
            ComponentKey::Bisagras => &mut self.bisagras,
            ComponentKey::Patas => &mut self.patas,
            ComponentKey::ClipPatas => &mut self.clip_patas,
            ComponentKey::Mensulas => &mut self.mensulas,
            ComponentKey::KitTornillo => &mut self.kit_tornillo,
            ComponentKey::Cif => &mut self.cif,
            ComponentKey::TipOnLargo => &mut self.tip_on_largo,
        }
    }
}

fn check_quantity(key: ComponentKey, quantity: Decimal) -> CoreResult<()> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: format!("{} quantity", key),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Material Selections
// =============================================================================

/// The materials a quotation line picked, one per explicit slot at most.
///
/// Deserializing applies the same slot kind check as
/// [`MaterialSelections::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct MaterialSelections(BTreeMap<MaterialSlot, MaterialSelection>);

impl MaterialSelections {
    pub fn new() -> Self {
        MaterialSelections::default()
    }

    /// Puts a material into a slot, replacing any previous pick.
    ///
    /// ## Rules
    /// The material's kind must be the slot's [`MaterialSlot::expected_kind`]:
    /// a hinge cannot be priced as carcass board.
    pub fn select(&mut self, slot: MaterialSlot, material: MaterialSelection) -> CoreResult<()> {
        let expected = slot.expected_kind();
        if material.kind != expected {
            return Err(CoreError::MaterialKindMismatch {
                slot: slot.to_string(),
                expected: expected.to_string(),
                actual: material.kind.to_string(),
                material: material.name,
            });
        }
        self.0.insert(slot, material);
        Ok(())
    }

    /// Builder-style [`MaterialSelections::select`].
    pub fn with(mut self, slot: MaterialSlot, material: MaterialSelection) -> CoreResult<Self> {
        self.select(slot, material)?;
        Ok(self)
    }

    /// Clears a slot ("none" in the UI).
    pub fn clear(&mut self, slot: MaterialSlot) -> Option<MaterialSelection> {
        self.0.remove(&slot)
    }

    pub fn get(&self, slot: MaterialSlot) -> Option<&MaterialSelection> {
        self.0.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialSlot, &MaterialSelection)> {
        self.0.iter().map(|(slot, material)| (*slot, material))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for MaterialSelections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let picked = BTreeMap::<MaterialSlot, MaterialSelection>::deserialize(deserializer)?;
        let mut selections = MaterialSelections::new();
        for (slot, material) in picked {
            selections
                .select(slot, material)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(selections)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn board(cost: Decimal) -> MaterialSelection {
        MaterialSelection::new(1, "Melamina blanca 16mm", cost, MaterialKind::Tablero).unwrap()
    }

    #[test]
    fn test_every_key_has_one_origin() {
        let slots = ComponentKey::ALL
            .iter()
            .filter(|k| matches!(k.origin(), CostOrigin::Slot(_)))
            .count();
        let accessories = ComponentKey::ALL
            .iter()
            .filter(|k| matches!(k.origin(), CostOrigin::Accessory(_)))
            .count();
        assert_eq!(slots, MaterialSlot::ALL.len());
        assert_eq!(accessories, AccessoryKind::ALL.len());

        for slot in MaterialSlot::ALL {
            assert_eq!(slot.component().origin(), CostOrigin::Slot(slot));
        }
        for kind in AccessoryKind::ALL {
            assert_eq!(kind.component().origin(), CostOrigin::Accessory(kind));
        }
    }

    #[test]
    fn test_bom_set_and_get() {
        let mut bom = FurnitureBom::new();
        bom.set(ComponentKey::Bisagras, Some(dec!(4))).unwrap();
        assert_eq!(bom.get(ComponentKey::Bisagras), Some(dec!(4)));

        bom.set(ComponentKey::Bisagras, None).unwrap();
        assert_eq!(bom.get(ComponentKey::Bisagras), None);
        assert_eq!(bom.quantity(ComponentKey::Bisagras), Decimal::ZERO);
    }

    #[test]
    fn test_bom_rejects_negative_quantity() {
        let mut bom = FurnitureBom::new();
        let err = bom.set(ComponentKey::Patas, Some(dec!(-1))).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(bom.get(ComponentKey::Patas), None);

        let bom = FurnitureBom::new().with(ComponentKey::Cif, dec!(-0.5));
        assert!(bom.validate().is_err());
    }

    #[test]
    fn test_bom_json_uses_camel_case_keys() {
        let bom = FurnitureBom::new()
            .with(ComponentKey::MatHuacal, dec!(2.5))
            .with(ComponentKey::KitTornillo, dec!(1));
        let json = serde_json::to_value(&bom).unwrap();
        assert_eq!(json["matHuacal"], "2.5");
        assert_eq!(json["kitTornillo"], "1");
        assert!(json["tipOnLargo"].is_null());

        let partial: FurnitureBom = serde_json::from_str(r#"{"patas":"4"}"#).unwrap();
        assert_eq!(partial.quantity(ComponentKey::Patas), dec!(4));
        assert_eq!(partial.get(ComponentKey::MatVista), None);
    }

    #[test]
    fn test_selection_kind_checked() {
        let mut selections = MaterialSelections::new();
        selections.select(MaterialSlot::MatVista, board(dec!(150))).unwrap();
        assert_eq!(
            selections.get(MaterialSlot::MatVista).map(|m| m.unit_cost),
            Some(dec!(150))
        );

        let err = selections
            .select(MaterialSlot::Bisagras, board(dec!(150)))
            .unwrap_err();
        assert!(matches!(err, CoreError::MaterialKindMismatch { .. }));
        assert!(selections.get(MaterialSlot::Bisagras).is_none());
    }

    #[test]
    fn test_selection_clear() {
        let mut selections = MaterialSelections::new()
            .with(MaterialSlot::MatHuacal, board(dec!(120)))
            .unwrap();
        assert!(selections.clear(MaterialSlot::MatHuacal).is_some());
        assert!(selections.is_empty());
    }

    #[test]
    fn test_selections_json_is_validated() {
        let ok: MaterialSelections = serde_json::from_str(
            r#"{"matHuacal":{"id":1,"name":"MDF","unitCost":"120","kind":"tablero"}}"#,
        )
        .unwrap();
        assert_eq!(
            ok.get(MaterialSlot::MatHuacal).map(|m| m.unit_cost),
            Some(dec!(120))
        );

        let negative = serde_json::from_str::<MaterialSelections>(
            r#"{"matHuacal":{"id":1,"name":"x","unitCost":"-100","kind":"tablero"}}"#,
        );
        assert!(negative.is_err());

        let wrong_slot = serde_json::from_str::<MaterialSelections>(
            r#"{"bisagras":{"id":1,"name":"MDF","unitCost":"120","kind":"tablero"}}"#,
        );
        assert!(wrong_slot.is_err());
    }
}
