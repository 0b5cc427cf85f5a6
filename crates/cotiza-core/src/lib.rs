//! # cotiza-core: Pure Quotation Logic
//!
//! Price calculation for furniture items and the project/furniture code
//! format. Everything here is deterministic and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cotiza Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ cotiza-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │    bom    │  │  catalog  │  │  pricing  │  │discrepancy│   │   │
//! │  │   │ quantities│─►│ unit cost │─►│  × mult.  │─►│ stored vs │   │   │
//! │  │   │ selections│  │ accessory │  │  → Money  │  │ recomputed│   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐               │   │
//! │  │   │   code    │  │ sequence  │  │furniture_code│               │   │
//! │  │   │ RE-505-001│  │ latest+1  │  │ …-CL-ALC[-A] │               │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                cotiza-db (Persistence Layer)                    │   │
//! │  │   SQLite repositories, code allocator, quotation service        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`bom`] - Component keys, quantities and per-slot material selections
//! - [`catalog`] - Unit cost resolution and the typed accessory table
//! - [`pricing`] - Price calculator
//! - [`discrepancy`] - Stored vs. recomputed price check
//! - [`code`] - Project code format and parse
//! - [`sequence`] - Next sequence within a bucket
//! - [`furniture_code`] - Per-item codes
//! - [`money`] - Integer-cents money type
//! - [`types`] - Project types, material kinds, catalog rows
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Design Principles
//!
//! 1. **Decimal in, cents out**: quantities and unit costs are exact decimals,
//!    only the final price is rounded to cents
//! 2. **No silent defaults**: a missing project type is an error, not ×1.0
//! 3. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use cotiza_core::*;
//! use rust_decimal_macros::dec;
//!
//! let bom = FurnitureBom::new()
//!     .with(ComponentKey::MatHuacal, dec!(2.5))
//!     .with(ComponentKey::MatVista, dec!(1.2));
//! let selections = MaterialSelections::new()
//!     .with(
//!         MaterialSlot::MatHuacal,
//!         MaterialSelection::new(1, "MDF 15mm", dec!(120), MaterialKind::Tablero).unwrap(),
//!     )
//!     .unwrap()
//!     .with(
//!         MaterialSlot::MatVista,
//!         MaterialSelection::new(2, "Roble", dec!(150), MaterialKind::Tablero).unwrap(),
//!     )
//!     .unwrap();
//!
//! let price = compute_price(
//!     &bom,
//!     &selections,
//!     &AccessoryCostTable::default(),
//!     Some(ProjectType::Residencial),
//! )
//! .unwrap();
//!
//! // (2.5 × 120 + 1.2 × 150) × 1.8
//! assert_eq!(price, Money::from_cents(86400));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bom;
pub mod catalog;
pub mod code;
pub mod discrepancy;
pub mod error;
pub mod furniture_code;
pub mod money;
pub mod pricing;
pub mod sequence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bom::{
    AccessoryKind, ComponentKey, CostOrigin, FurnitureBom, MaterialSelections, MaterialSlot,
};
pub use catalog::{resolve_unit_cost, AccessoryCostTable, CostSource, ResolvedCost};
pub use code::{
    format_project_code, parse_project_code, CodeBucket, ProjectCode, TypePrefix,
    DEFAULT_DECADE_START, MAX_SEQUENCE,
};
pub use discrepancy::{check_discrepancy, DiscrepancyReport, DISCREPANCY_TOLERANCE_CENTS};
pub use error::{CoreError, CoreResult, ValidationError};
pub use furniture_code::{
    compose_furniture_code, AreaCode, FurnitureCode, FurnitureType, ProductionType,
};
pub use money::Money;
pub use pricing::{compute_price, price_breakdown, PriceBreakdown, PriceComponent};
pub use sequence::{next_sequence_after, sequence_of};
pub use types::*;
