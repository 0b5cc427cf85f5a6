//! # Furniture Codes
//!
//! Per-item codes derived from the project code. No sequencing happens here.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   RE-505-001  -  CL  -  ALC  [- A]                                      │
//! │   └────┬────┘    │      │       └── production: A adicional, G garantía │
//! │        │         │      └────────── furniture type (3 letters)          │
//! │        │         └───────────────── area (2 letters)                    │
//! │        └─────────────────────────── project code, prototype included    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::code::{ProjectCode, DEFAULT_DECADE_START};
use crate::error::{CoreError, CoreResult};
use crate::validation::validate_token;

// =============================================================================
// Area
// =============================================================================

/// Room or zone a piece of furniture is installed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AreaCode {
    #[serde(rename = "CO")]
    Cocina,
    #[serde(rename = "CL")]
    Closet,
    #[serde(rename = "BA")]
    Bano,
    #[serde(rename = "LA")]
    Lavanderia,
    #[serde(rename = "RE")]
    Recamara,
    #[serde(rename = "ES")]
    Estudio,
    #[serde(rename = "SA")]
    Sala,
    #[serde(rename = "CM")]
    Comedor,
    #[serde(rename = "VE")]
    Vestidor,
}

impl AreaCode {
    pub const ALL: [AreaCode; 9] = [
        AreaCode::Cocina,
        AreaCode::Closet,
        AreaCode::Bano,
        AreaCode::Lavanderia,
        AreaCode::Recamara,
        AreaCode::Estudio,
        AreaCode::Sala,
        AreaCode::Comedor,
        AreaCode::Vestidor,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AreaCode::Cocina => "CO",
            AreaCode::Closet => "CL",
            AreaCode::Bano => "BA",
            AreaCode::Lavanderia => "LA",
            AreaCode::Recamara => "RE",
            AreaCode::Estudio => "ES",
            AreaCode::Sala => "SA",
            AreaCode::Comedor => "CM",
            AreaCode::Vestidor => "VE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AreaCode::Cocina => "Cocina",
            AreaCode::Closet => "Closet",
            AreaCode::Bano => "Baño",
            AreaCode::Lavanderia => "Lavandería",
            AreaCode::Recamara => "Recámara",
            AreaCode::Estudio => "Estudio",
            AreaCode::Sala => "Sala",
            AreaCode::Comedor => "Comedor",
            AreaCode::Vestidor => "Vestidor",
        }
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AreaCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes: Vec<&str> = AreaCode::ALL.iter().map(|a| a.code()).collect();
        let code = validate_token("area", s, &codes)?;
        AreaCode::ALL
            .into_iter()
            .find(|a| a.code() == code)
            .ok_or_else(|| CoreError::malformed(s, "unknown area"))
    }
}

// =============================================================================
// Furniture Type
// =============================================================================

/// Kind of furniture piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FurnitureType {
    #[serde(rename = "ALC")]
    Alacena,
    #[serde(rename = "GBA")]
    GabineteBajo,
    #[serde(rename = "GAL")]
    GabineteAlto,
    #[serde(rename = "ISL")]
    Isla,
    #[serde(rename = "CAJ")]
    Cajonera,
    #[serde(rename = "ENT")]
    Entrepanos,
    #[serde(rename = "LIB")]
    Librero,
    #[serde(rename = "TOC")]
    Tocador,
    #[serde(rename = "LAV")]
    Lavabo,
    #[serde(rename = "PAN")]
    Panel,
}

impl FurnitureType {
    pub const ALL: [FurnitureType; 10] = [
        FurnitureType::Alacena,
        FurnitureType::GabineteBajo,
        FurnitureType::GabineteAlto,
        FurnitureType::Isla,
        FurnitureType::Cajonera,
        FurnitureType::Entrepanos,
        FurnitureType::Librero,
        FurnitureType::Tocador,
        FurnitureType::Lavabo,
        FurnitureType::Panel,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FurnitureType::Alacena => "ALC",
            FurnitureType::GabineteBajo => "GBA",
            FurnitureType::GabineteAlto => "GAL",
            FurnitureType::Isla => "ISL",
            FurnitureType::Cajonera => "CAJ",
            FurnitureType::Entrepanos => "ENT",
            FurnitureType::Librero => "LIB",
            FurnitureType::Tocador => "TOC",
            FurnitureType::Lavabo => "LAV",
            FurnitureType::Panel => "PAN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FurnitureType::Alacena => "Alacena",
            FurnitureType::GabineteBajo => "Gabinete bajo",
            FurnitureType::GabineteAlto => "Gabinete alto",
            FurnitureType::Isla => "Isla",
            FurnitureType::Cajonera => "Cajonera",
            FurnitureType::Entrepanos => "Entrepaños",
            FurnitureType::Librero => "Librero",
            FurnitureType::Tocador => "Tocador",
            FurnitureType::Lavabo => "Mueble de lavabo",
            FurnitureType::Panel => "Panel/Cubierta",
        }
    }
}

impl fmt::Display for FurnitureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FurnitureType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes: Vec<&str> = FurnitureType::ALL.iter().map(|t| t.code()).collect();
        let code = validate_token("furniture type", s, &codes)?;
        FurnitureType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| CoreError::malformed(s, "unknown furniture type"))
    }
}

// =============================================================================
// Production Type
// =============================================================================

/// Why a piece is produced. Absent means original production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductionType {
    /// Added after the original order.
    #[serde(rename = "A")]
    Adicional,
    /// Warranty replacement.
    #[serde(rename = "G")]
    Garantia,
}

impl ProductionType {
    pub fn code(&self) -> &'static str {
        match self {
            ProductionType::Adicional => "A",
            ProductionType::Garantia => "G",
        }
    }
}

impl fmt::Display for ProductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProductionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match validate_token("production type", s, &["A", "G"])? {
            "A" => Ok(ProductionType::Adicional),
            _ => Ok(ProductionType::Garantia),
        }
    }
}

// =============================================================================
// Furniture Code
// =============================================================================

/// Project code plus area, furniture type and optional production type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureCode {
    pub project: ProjectCode,
    pub area: AreaCode,
    pub furniture_type: FurnitureType,
    pub production: Option<ProductionType>,
}

impl FurnitureCode {
    pub fn new(
        project: ProjectCode,
        area: AreaCode,
        furniture_type: FurnitureType,
        production: Option<ProductionType>,
    ) -> Self {
        FurnitureCode {
            project,
            area,
            furniture_type,
            production,
        }
    }
}

impl fmt::Display for FurnitureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.project, self.area, self.furniture_type)?;
        if let Some(production) = self.production {
            write!(f, "-{}", production)?;
        }
        Ok(())
    }
}

impl FurnitureCode {
    /// Parses a code whose project part was issued in the decade starting at
    /// `decade_start` (any year of that decade works, e.g. the project's own
    /// year).
    ///
    /// Splits from the right: `[-A|G]`, then type, then area; the rest is
    /// the project code.
    pub fn parse_with_decade(s: &str, decade_start: i32) -> CoreResult<Self> {
        let mut segments: Vec<&str> = s.trim().split('-').collect();

        let production = match segments.last() {
            Some(last) if last.len() == 1 => {
                let production = last
                    .parse::<ProductionType>()
                    .map_err(|e| CoreError::malformed(s, e.to_string()))?;
                segments.pop();
                Some(production)
            }
            _ => None,
        };

        if segments.len() < 5 {
            return Err(CoreError::malformed(
                s,
                "expected a project code followed by area and furniture type",
            ));
        }
        let furniture_type = segments
            .pop()
            .unwrap_or_default()
            .parse::<FurnitureType>()
            .map_err(|e| CoreError::malformed(s, e.to_string()))?;
        let area = segments
            .pop()
            .unwrap_or_default()
            .parse::<AreaCode>()
            .map_err(|e| CoreError::malformed(s, e.to_string()))?;
        let project = ProjectCode::parse_with_decade(&segments.join("-"), decade_start)
            .map_err(|e| CoreError::malformed(s, e.to_string()))?;

        Ok(FurnitureCode::new(project, area, furniture_type, production))
    }
}

impl FromStr for FurnitureCode {
    type Err = CoreError;

    /// Reads the project year in the 2020s.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FurnitureCode::parse_with_decade(s, DEFAULT_DECADE_START)
    }
}

/// Composes a furniture code from string tokens.
///
/// ## Example
/// ```rust
/// use cotiza_core::furniture_code::compose_furniture_code;
///
/// let code = compose_furniture_code("RE-505-001", "CL", "ALC", None).unwrap();
/// assert_eq!(code.to_string(), "RE-505-001-CL-ALC");
///
/// let extra = compose_furniture_code("RE-505-001", "CL", "ALC", Some("A")).unwrap();
/// assert_eq!(extra.to_string(), "RE-505-001-CL-ALC-A");
///
/// assert!(compose_furniture_code("RE-505-001", "XX", "ALC", None).is_err());
/// ```
pub fn compose_furniture_code(
    project_code: &str,
    area: &str,
    furniture_type: &str,
    production: Option<&str>,
) -> CoreResult<FurnitureCode> {
    let project: ProjectCode = project_code.parse()?;
    let area: AreaCode = area.parse()?;
    let furniture_type: FurnitureType = furniture_type.parse()?;
    let production = production.map(str::parse::<ProductionType>).transpose()?;
    Ok(FurnitureCode::new(project, area, furniture_type, production))
}

// =============================================================================
// Unit Tests
// =============================================================================
