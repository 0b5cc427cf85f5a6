//! # Domain Types
//!
//! Catalog and project types shared by the pricing and code modules.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────────┐  ┌────────────────────┐  ┌──────────────────┐   │
//! │  │ MaterialSelection │  │ AccessoryCostEntry │  │   ProjectType    │   │
//! │  │ ───────────────── │  │ ────────────────── │  │ ──────────────── │   │
//! │  │ id (catalog)      │  │ name               │  │ Residencial ×1.8 │   │
//! │  │ name              │  │ category           │  │ Desarrollo  ×1.5 │   │
//! │  │ unit_cost (Dec)   │  │ unit_cost (Dec)    │  │ Other       ×1.0 │   │
//! │  │ kind              │  └────────────────────┘  └──────────────────┘   │
//! │  └───────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Material and accessory rows are immutable snapshots: a quotation keeps the
//! cost it was priced with, the catalog owns the current one.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_material_name, validate_unit_cost};

// =============================================================================
// Multiplier
// =============================================================================

/// Cost multiplier applied to every priced component.
///
/// Always strictly positive; only [`ProjectType::multiplier`] creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Multiplier(#[ts(type = "string")] Decimal);

impl Multiplier {
    /// Returns the factor as a decimal.
    #[inline]
    pub const fn factor(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "×{}", self.0)
    }
}

// =============================================================================
// Project Type
// =============================================================================

/// Kind of project a quotation belongs to.
///
/// ## Multipliers
/// | Type        | Factor |
/// |-------------|--------|
/// | Residencial | 1.8    |
/// | Desarrollo  | 1.5    |
/// | Other       | 1.0    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Single-home project, coded `RE-…`.
    Residencial,
    /// Vertical development (towers, housing), coded with its own prefix.
    Desarrollo,
    /// Anything else; priced at cost.
    Other,
}

impl ProjectType {
    /// All known project types.
    pub const ALL: [ProjectType; 3] = [
        ProjectType::Residencial,
        ProjectType::Desarrollo,
        ProjectType::Other,
    ];

    /// Returns the cost multiplier for this project type.
    ///
    /// Exhaustive on purpose: adding a variant fails to compile until it has
    /// a factor.
    pub fn multiplier(&self) -> Multiplier {
        match self {
            ProjectType::Residencial => Multiplier(dec!(1.8)),
            ProjectType::Desarrollo => Multiplier(dec!(1.5)),
            ProjectType::Other => Multiplier(dec!(1.0)),
        }
    }

    /// Stable lowercase name, used for storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Residencial => "residencial",
            ProjectType::Desarrollo => "desarrollo",
            ProjectType::Other => "other",
        }
    }

    /// Whether codes for this type are vertical-project codes (custom prefix,
    /// optional prototype). Everything but Residencial is.
    pub const fn is_vertical(&self) -> bool {
        !matches!(self, ProjectType::Residencial)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a project type name.
///
/// ## Rules
/// - Case-insensitive, surrounding whitespace ignored
/// - Empty → [`CoreError::MissingProjectType`]
/// - Unrecognized → [`CoreError::UnknownProjectType`] (never coerced to Other)
impl FromStr for ProjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "" => Err(CoreError::MissingProjectType),
            "residencial" => Ok(ProjectType::Residencial),
            "desarrollo" | "vertical" => Ok(ProjectType::Desarrollo),
            "other" | "otro" => Ok(ProjectType::Other),
            _ => Err(CoreError::UnknownProjectType(s.trim().to_string())),
        }
    }
}

// =============================================================================
// Material Kind
// =============================================================================

/// Catalog category of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Board (melamine, MDF, plywood).
    Tablero,
    /// Edge banding.
    Cubrecanto,
    /// Handle.
    Jaladera,
    /// Drawer slide.
    Corredera,
    /// Hinge.
    Bisagra,
    /// Hardware accessory (push-to-open, etc.).
    Accesorio,
    Otro,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 7] = [
        MaterialKind::Tablero,
        MaterialKind::Cubrecanto,
        MaterialKind::Jaladera,
        MaterialKind::Corredera,
        MaterialKind::Bisagra,
        MaterialKind::Accesorio,
        MaterialKind::Otro,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Tablero => "tablero",
            MaterialKind::Cubrecanto => "cubrecanto",
            MaterialKind::Jaladera => "jaladera",
            MaterialKind::Corredera => "corredera",
            MaterialKind::Bisagra => "bisagra",
            MaterialKind::Accesorio => "accesorio",
            MaterialKind::Otro => "otro",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        MaterialKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "material kind".to_string(),
                allowed: MaterialKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Material Selection
// =============================================================================

/// A catalog material picked into a quotation slot.
///
/// Deserializing goes through [`MaterialSelection::new`], so a payload with a
/// negative cost or a blank name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSelection {
    /// Catalog id.
    pub id: i64,
    pub name: String,
    /// Cost per unit (m², linear metre, piece...), never negative.
    #[ts(as = "String")]
    pub unit_cost: Decimal,
    pub kind: MaterialKind,
}

impl MaterialSelection {
    /// Creates a material snapshot, rejecting negative costs.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::{MaterialKind, MaterialSelection};
    /// use rust_decimal_macros::dec;
    ///
    /// let board = MaterialSelection::new(1, "Melamina blanca 16mm", dec!(120), MaterialKind::Tablero);
    /// assert!(board.is_ok());
    ///
    /// let bad = MaterialSelection::new(2, "Error", dec!(-1), MaterialKind::Tablero);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        id: i64,
        name: impl Into<String>,
        unit_cost: Decimal,
        kind: MaterialKind,
    ) -> CoreResult<Self> {
        let name = name.into();
        validate_material_name(&name)?;
        validate_unit_cost(unit_cost)?;
        Ok(MaterialSelection {
            id,
            name,
            unit_cost,
            kind,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialSelectionRaw {
    id: i64,
    name: String,
    unit_cost: Decimal,
    kind: MaterialKind,
}

impl<'de> Deserialize<'de> for MaterialSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = MaterialSelectionRaw::deserialize(deserializer)?;
        MaterialSelection::new(raw.id, raw.name, raw.unit_cost, raw.kind)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Accessory Cost Entry
// =============================================================================

/// A row of the shared accessory cost table (legs, clips, brackets...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryCostEntry {
    pub name: String,
    pub category: String,
    #[ts(as = "String")]
    pub unit_cost: Decimal,
}

impl AccessoryCostEntry {
    /// Creates an accessory row, rejecting blank names and negative costs.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        unit_cost: Decimal,
    ) -> CoreResult<Self> {
        let name = name.into();
        validate_material_name(&name)?;
        validate_unit_cost(unit_cost)?;
        Ok(AccessoryCostEntry {
            name,
            category: category.into(),
            unit_cost,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessoryCostEntryRaw {
    name: String,
    category: String,
    unit_cost: Decimal,
}

impl<'de> Deserialize<'de> for AccessoryCostEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = AccessoryCostEntryRaw::deserialize(deserializer)?;
        AccessoryCostEntry::new(raw.name, raw.category, raw.unit_cost)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
