//! # Validation Module
//!
//! Input validation for catalog rows, project codes and furniture codes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Constructors (this crate)                                     │
//! │  ├── MaterialSelection::new / AccessoryCostEntry::new → unit cost       │
//! │  ├── ProjectCode::new → month, sequence, prototype                      │
//! │  └── THIS MODULE: shared field rules                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  └── UNIQUE (type_prefix, year_digit, month, sequence)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cotiza_core::validation::{validate_material_name, validate_prototype};
//!
//! validate_material_name("MDF 15mm").unwrap();
//! validate_prototype("B1").unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted prototype suffix.
pub const MAX_PROTOTYPE_LEN: usize = 10;

/// Longest accepted material or accessory name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog unit cost.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free or sample material)
///
/// ## Example
/// ```rust
/// use cotiza_core::validation::validate_unit_cost;
/// use rust_decimal_macros::dec;
///
/// assert!(validate_unit_cost(dec!(120.50)).is_ok());
/// assert!(validate_unit_cost(dec!(0)).is_ok());
/// assert!(validate_unit_cost(dec!(-0.01)).is_err());
/// ```
pub fn validate_unit_cost(unit_cost: Decimal) -> ValidationResult<()> {
    if unit_cost.is_sign_negative() && !unit_cost.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit cost".to_string(),
        });
    }

    Ok(())
}

/// Validates a stored price in cents.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a material or accessory name.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_material_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::OutOfRange {
            field: "name length".to_string(),
            min: 1,
            max: MAX_NAME_LEN as i64,
        });
    }

    Ok(())
}

/// Validates a prototype suffix of a vertical project code.
///
/// ## Rules
/// - Must not be empty
/// - ASCII letters and digits only (a hyphen would split the code)
/// - At most [`MAX_PROTOTYPE_LEN`] characters
///
/// ## Example
/// ```rust
/// use cotiza_core::validation::validate_prototype;
///
/// assert!(validate_prototype("B1").is_ok());
/// assert!(validate_prototype("").is_err());
/// assert!(validate_prototype("B-1").is_err());
/// ```
pub fn validate_prototype(prototype: &str) -> ValidationResult<()> {
    if prototype.is_empty() {
        return Err(ValidationError::Required {
            field: "prototype".to_string(),
        });
    }

    if prototype.len() > MAX_PROTOTYPE_LEN {
        return Err(ValidationError::OutOfRange {
            field: "prototype length".to_string(),
            min: 1,
            max: MAX_PROTOTYPE_LEN as i64,
        });
    }

    if !prototype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "prototype".to_string(),
            reason: "must contain only ASCII letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a closed-set token (area, furniture type, production type).
///
/// Returns the matching entry of `allowed`.
pub fn validate_token<'a>(field: &str, value: &str, allowed: &[&'a str]) -> ValidationResult<&'a str> {
    allowed
        .iter()
        .copied()
        .find(|candidate| *candidate == value)
        .ok_or_else(|| ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost(dec!(0)).is_ok());
        assert!(validate_unit_cost(dec!(-0)).is_ok());
        assert!(validate_unit_cost(dec!(999999.99)).is_ok());

        let err = validate_unit_cost(dec!(-1)).unwrap_err();
        assert!(matches!(err, ValidationError::MustBeNonNegative { .. }));
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(93600).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_material_name() {
        assert!(validate_material_name("Melamina blanca 16mm").is_ok());
        assert!(validate_material_name("").is_err());
        assert!(validate_material_name("   ").is_err());
        assert!(validate_material_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_prototype() {
        assert!(validate_prototype("B1").is_ok());
        assert!(validate_prototype("TORREA").is_ok());

        assert!(validate_prototype("").is_err());
        assert!(validate_prototype("B 1").is_err());
        assert!(validate_prototype("B-1").is_err());
        assert!(validate_prototype("Ñ1").is_err());
        assert!(validate_prototype(&"A".repeat(11)).is_err());
    }

    #[test]
    fn test_validate_token() {
        let allowed = ["CO", "CL"];
        assert_eq!(validate_token("area", "CL", &allowed).unwrap(), "CL");

        let err = validate_token("area", "XX", &allowed).unwrap_err();
        match err {
            ValidationError::NotAllowed { field, allowed } => {
                assert_eq!(field, "area");
                assert_eq!(allowed, vec!["CO".to_string(), "CL".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
