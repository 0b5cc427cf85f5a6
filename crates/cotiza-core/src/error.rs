//! # Error Types
//!
//! Domain-specific error types for cotiza-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cotiza-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing / code domain errors                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cotiza-db errors (separate crate)                                     │
//! │  └── DbError          - Database + allocation failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, field, slot)
//! 3. Errors are enum variants, never String
//! 4. A price drift is NOT an error: see [`crate::discrepancy`]

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A price was requested without a project type.
    ///
    /// ## When This Occurs
    /// - Quotation line priced before the project type was chosen
    ///
    /// The multiplier is never defaulted to 1.0 behind the caller's back.
    #[error("Project type is required to compute a price")]
    MissingProjectType,

    /// Project type name is not one of the known types.
    #[error("Unknown project type: '{0}'")]
    UnknownProjectType(String),

    /// A project or furniture code could not be parsed.
    ///
    /// ## When This Occurs
    /// - Fewer than 3 hyphen-separated segments
    /// - Non-numeric year/month or sequence segment
    /// - Area or furniture-type token outside the closed sets
    #[error("Malformed code '{code}': {reason}")]
    MalformedCode { code: String, reason: String },

    /// The 3-digit sequence field of a bucket is used up.
    ///
    /// ## User Workflow
    /// ```text
    /// Bucket RE-505- already holds RE-505-999
    ///      │
    ///      ▼
    /// next_sequence_after("RE-505-999")
    ///      │
    ///      ▼
    /// SequenceExhausted { bucket: "RE-505-" }
    /// ```
    #[error("Sequence exhausted for bucket {bucket} (max {max})")]
    SequenceExhausted { bucket: String, max: u16 },

    /// A material was put into a slot that expects another kind.
    #[error("Slot {slot} expects a {expected} material, got {actual} ('{material}')")]
    MaterialKindMismatch {
        slot: String,
        expected: String,
        actual: String,
        material: String,
    },

    /// A price term or total does not fit the decimal or cents range.
    ///
    /// ## When This Occurs
    /// - Absurd BOM quantity or unit cost (e.g. 1e19 × 1e11)
    /// - Total above i64::MAX cents
    #[error("Price overflow in {term}")]
    PriceOverflow { term: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MalformedCode error.
    pub fn malformed(code: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedCode {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., lowercase prefix, prototype with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::malformed("RE-505", "expected at least 3 segments");
        assert_eq!(
            err.to_string(),
            "Malformed code 'RE-505': expected at least 3 segments"
        );

        let err = CoreError::SequenceExhausted {
            bucket: "RE-505-".to_string(),
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Sequence exhausted for bucket RE-505- (max 999)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "project name".to_string(),
        };
        assert_eq!(err.to_string(), "project name is required");

        let err = ValidationError::MustBeNonNegative {
            field: "unit cost".to_string(),
        };
        assert_eq!(err.to_string(), "unit cost must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "month".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
