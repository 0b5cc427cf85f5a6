//! # Project Codes
//!
//! Encode/decode between [`ProjectCode`] and its canonical string.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   RE  -  505  -  001  [- B1]                                            │
//! │   │      │││     │        │                                             │
//! │   │      ││└─┬───┘        └── prototype (vertical projects only)        │
//! │   │      │└──┴── month, zero-padded       sequence, zero-padded (3)     │
//! │   │      └────── last digit of the year                                 │
//! │   └───────────── type prefix: RE = Residencial, else vertical code      │
//! │                                                                         │
//! │   Bucket = (prefix, year digit, month) → rendered "RE-505-"             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Year Recovery
//! The string keeps one year digit. [`ProjectCode::from_str`] reads it in the
//! 2020s; [`ProjectCode::parse_with_decade`] takes the decade explicitly.
//! Persisted projects store the full year, so stored data never depends on
//! this inference.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::ProjectType;
use crate::validation::validate_prototype;

/// First year of the decade assumed when parsing a code.
pub const DEFAULT_DECADE_START: i32 = 2020;

/// Highest sequence that fits the 3-digit field.
pub const MAX_SEQUENCE: u16 = 999;

// =============================================================================
// Type Prefix
// =============================================================================

/// Two uppercase ASCII letters opening every code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "String", into = "String")]
pub struct TypePrefix(String);

impl TypePrefix {
    /// Prefix of residential projects.
    pub const RESIDENTIAL: &'static str = "RE";

    /// Validates a configured 2-letter prefix (e.g. `WN`).
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::code::TypePrefix;
    ///
    /// assert_eq!(TypePrefix::new("WN").unwrap().as_str(), "WN");
    /// assert!(TypePrefix::new("wn").is_err());
    /// assert!(TypePrefix::new("W").is_err());
    /// ```
    pub fn new(code: &str) -> CoreResult<Self> {
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(TypePrefix(code.to_string()))
        } else {
            Err(ValidationError::InvalidFormat {
                field: "type prefix".to_string(),
                reason: format!("'{}' must be exactly 2 uppercase letters", code),
            }
            .into())
        }
    }

    /// The `RE` prefix.
    pub fn residential() -> Self {
        TypePrefix(Self::RESIDENTIAL.to_string())
    }

    /// First and last letter of a project name, uppercased.
    ///
    /// Accented Spanish letters fold to their base letter; digits, spaces and
    /// punctuation are skipped.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::code::TypePrefix;
    ///
    /// assert_eq!(TypePrefix::from_project_name("Winston").unwrap().as_str(), "WN");
    /// assert_eq!(TypePrefix::from_project_name("torre río").unwrap().as_str(), "TO");
    /// assert!(TypePrefix::from_project_name("  ").is_err());
    /// ```
    pub fn from_project_name(name: &str) -> CoreResult<Self> {
        let letters: Vec<char> = name.chars().filter_map(fold_letter).collect();
        match (letters.first(), letters.last()) {
            (Some(first), Some(last)) => Ok(TypePrefix(format!("{}{}", first, last))),
            _ => Err(ValidationError::Required {
                field: "project name".to_string(),
            }
            .into()),
        }
    }

    /// Picks the prefix for a new project.
    ///
    /// ## Rules
    /// - Residencial → `RE`
    /// - Vertical: the configured code if any, else derived from the name
    /// - Neither given → `InvalidInput` (never a silent default)
    /// - A vertical project never gets `RE` (e.g. a project named "Rose"),
    ///   so it cannot land in the residential bucket
    pub fn for_project(
        project_type: ProjectType,
        configured: Option<&str>,
        project_name: Option<&str>,
    ) -> CoreResult<Self> {
        if !project_type.is_vertical() {
            return Ok(TypePrefix::residential());
        }
        let prefix = match (configured, project_name) {
            (Some(code), _) => TypePrefix::new(code)?,
            (None, Some(name)) => TypePrefix::from_project_name(name)?,
            (None, None) => {
                return Err(ValidationError::Required {
                    field: "project name".to_string(),
                }
                .into())
            }
        };
        if prefix.is_residential() {
            return Err(ValidationError::InvalidFormat {
                field: "type prefix".to_string(),
                reason: format!("{} is reserved for residential projects", Self::RESIDENTIAL),
            }
            .into());
        }
        Ok(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_residential(&self) -> bool {
        self.0 == Self::RESIDENTIAL
    }
}

fn fold_letter(c: char) -> Option<char> {
    let base = match c {
        'á' | 'Á' | 'à' | 'À' => 'A',
        'é' | 'É' | 'è' | 'È' => 'E',
        'í' | 'Í' | 'ì' | 'Ì' => 'I',
        'ó' | 'Ó' | 'ò' | 'Ò' => 'O',
        'ú' | 'Ú' | 'ü' | 'Ü' | 'ù' | 'Ù' => 'U',
        'ñ' | 'Ñ' => 'N',
        c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
        _ => return None,
    };
    Some(base)
}

impl fmt::Display for TypePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TypePrefix {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypePrefix::new(&value)
    }
}

impl From<TypePrefix> for String {
    fn from(prefix: TypePrefix) -> Self {
        prefix.0
    }
}

// =============================================================================
// Code Bucket
// =============================================================================

/// `(prefix, year, month)` group inside which sequences must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CodeBucket {
    pub type_prefix: TypePrefix,
    pub year: i32,
    pub month: u32,
}

impl CodeBucket {
    pub fn new(type_prefix: TypePrefix, year: i32, month: u32) -> CoreResult<Self> {
        validate_month(month)?;
        Ok(CodeBucket {
            type_prefix,
            year,
            month,
        })
    }

    /// Bucket of the month `date` falls in.
    pub fn for_date(type_prefix: TypePrefix, date: NaiveDate) -> Self {
        CodeBucket {
            type_prefix,
            year: date.year(),
            month: date.month(),
        }
    }

    /// Last digit of the year, as written in the code.
    pub fn year_digit(&self) -> u8 {
        self.year.rem_euclid(10) as u8
    }

    /// The `TYPE-YYM-` prefix shared by every code of this bucket.
    pub fn prefix(&self) -> String {
        format!(
            "{}-{}{:02}-",
            self.type_prefix,
            self.year_digit(),
            self.month
        )
    }

    /// The code with `sequence` in this bucket.
    pub fn code(&self, sequence: u16, prototype: Option<String>) -> CoreResult<ProjectCode> {
        ProjectCode::new(
            self.type_prefix.clone(),
            self.year,
            self.month,
            sequence,
            prototype,
        )
    }
}

impl fmt::Display for CodeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

// =============================================================================
// Project Code
// =============================================================================

/// Structured form of `TYPE-YYM-SEQ[-PROTO]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCode {
    pub type_prefix: TypePrefix,
    /// Full year; only its last digit is encoded.
    pub year: i32,
    pub month: u32,
    pub sequence: u16,
    pub prototype: Option<String>,
}

impl ProjectCode {
    /// Creates a validated project code.
    ///
    /// ## Rules
    /// - month 1-12
    /// - sequence 1-999
    /// - prototype, when present, non-empty ASCII alphanumeric
    pub fn new(
        type_prefix: TypePrefix,
        year: i32,
        month: u32,
        sequence: u16,
        prototype: Option<String>,
    ) -> CoreResult<Self> {
        validate_month(month)?;
        validate_sequence(sequence)?;
        if let Some(proto) = prototype.as_deref() {
            validate_prototype(proto)?;
        }
        Ok(ProjectCode {
            type_prefix,
            year,
            month,
            sequence,
            prototype,
        })
    }

    /// The bucket this code was allocated in.
    pub fn bucket(&self) -> CodeBucket {
        CodeBucket {
            type_prefix: self.type_prefix.clone(),
            year: self.year,
            month: self.month,
        }
    }

    /// The code without its prototype suffix (`TYPE-YYM-SEQ`).
    pub fn base(&self) -> String {
        format!("{}{:03}", self.bucket().prefix(), self.sequence)
    }

    /// Parses a code, reading the year digit inside the decade that starts at
    /// `decade_start` (e.g. `2030` for codes issued in the 2030s).
    pub fn parse_with_decade(code: &str, decade_start: i32) -> CoreResult<Self> {
        let trimmed = code.trim();
        let segments: Vec<&str> = trimmed.split('-').collect();
        if segments.len() < 3 {
            return Err(CoreError::malformed(
                code,
                format!("expected at least 3 segments, found {}", segments.len()),
            ));
        }
        if segments.len() > 4 {
            return Err(CoreError::malformed(
                code,
                format!("expected at most 4 segments, found {}", segments.len()),
            ));
        }

        let type_prefix = TypePrefix::new(segments[0])
            .map_err(|_| CoreError::malformed(code, "type prefix must be 2 uppercase letters"))?;

        let yym = segments[1];
        if yym.len() != 3 || !yym.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::malformed(code, "date segment must be 3 digits (YMM)"));
        }
        let year_digit = i32::from(yym.as_bytes()[0] - b'0');
        let month: u32 = yym[1..]
            .parse()
            .map_err(|_| CoreError::malformed(code, "month is not numeric"))?;
        let decade = decade_start - decade_start.rem_euclid(10);

        let sequence = parse_sequence(code, segments[2])?;
        let prototype = segments.get(3).map(|p| p.to_string());

        ProjectCode::new(type_prefix, decade + year_digit, month, sequence, prototype)
            .map_err(|e| CoreError::malformed(code, e.to_string()))
    }
}

/// Parses the numeric sequence segment of a code.
pub(crate) fn parse_sequence(code: &str, segment: &str) -> CoreResult<u16> {
    if segment.is_empty() || segment.len() > 3 || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::malformed(
            code,
            format!("sequence '{}' is not a 1-3 digit number", segment),
        ));
    }
    segment
        .parse()
        .map_err(|_| CoreError::malformed(code, "sequence is not numeric"))
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base())?;
        if let Some(proto) = &self.prototype {
            write!(f, "-{}", proto)?;
        }
        Ok(())
    }
}

impl FromStr for ProjectCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectCode::parse_with_decade(s, DEFAULT_DECADE_START)
    }
}

/// Renders a project code (`TYPE-YYM-SEQ[-PROTO]`).
///
/// ## Example
/// ```rust
/// use cotiza_core::code::{format_project_code, ProjectCode, TypePrefix};
///
/// let code = ProjectCode::new(TypePrefix::residential(), 2025, 5, 1, None).unwrap();
/// assert_eq!(format_project_code(&code), "RE-505-001");
/// ```
pub fn format_project_code(code: &ProjectCode) -> String {
    code.to_string()
}

/// Parses a project code, assuming a 2020s year.
///
/// ## Example
/// ```rust
/// use cotiza_core::code::parse_project_code;
///
/// let code = parse_project_code("RE-505-001").unwrap();
/// assert_eq!((code.year, code.month, code.sequence), (2025, 5, 1));
/// assert!(parse_project_code("RE-505").is_err());
/// ```
pub fn parse_project_code(code: &str) -> CoreResult<ProjectCode> {
    code.parse()
}

fn validate_month(month: u32) -> CoreResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        }
        .into());
    }
    Ok(())
}

fn validate_sequence(sequence: u16) -> CoreResult<()> {
    if !(1..=MAX_SEQUENCE).contains(&sequence) {
        return Err(ValidationError::OutOfRange {
            field: "sequence".to_string(),
            min: 1,
            max: i64::from(MAX_SEQUENCE),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(prefix: &str) -> TypePrefix {
        TypePrefix::new(prefix).unwrap()
    }

    #[test]
    fn test_format_residential() {
        let code = ProjectCode::new(TypePrefix::residential(), 2025, 5, 1, None).unwrap();
        assert_eq!(code.to_string(), "RE-505-001");

        let code = ProjectCode::new(TypePrefix::residential(), 2026, 11, 42, None).unwrap();
        assert_eq!(code.to_string(), "RE-611-042");
    }

    #[test]
    fn test_format_vertical_with_prototype() {
        let code =
            ProjectCode::new(vertical("WN"), 2025, 12, 7, Some("B1".to_string())).unwrap();
        assert_eq!(code.to_string(), "WN-512-007-B1");
        assert_eq!(code.base(), "WN-512-007");
    }

    #[test]
    fn test_parse_reference_code() {
        let code = parse_project_code("RE-505-001").unwrap();
        assert_eq!(code.type_prefix.as_str(), "RE");
        assert_eq!(code.year, 2025);
        assert_eq!(code.month, 5);
        assert_eq!(code.sequence, 1);
        assert_eq!(code.prototype, None);
    }

    #[test]
    fn test_round_trip() {
        let prototypes = [None, Some("B1".to_string()), Some("TORREA".to_string())];
        for year in 2020..=2029 {
            for month in [1, 6, 12] {
                for sequence in [1, 10, 999] {
                    for prototype in prototypes.iter().cloned() {
                        let code =
                            ProjectCode::new(vertical("WN"), year, month, sequence, prototype)
                                .unwrap();
                        let parsed = parse_project_code(&format_project_code(&code)).unwrap();
                        assert_eq!(parsed, code);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_with_decade() {
        let code = ProjectCode::parse_with_decade("RE-301-005", 2030).unwrap();
        assert_eq!(code.year, 2033);

        // Any year inside the decade selects that decade.
        let code = ProjectCode::parse_with_decade("RE-301-005", 2037).unwrap();
        assert_eq!(code.year, 2033);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "RE",
            "RE-505",
            "RE-505-",
            "RE-505-abc",
            "RE-505-0001",
            "RE-505-000",
            "re-505-001",
            "RE-5O5-001",
            "RE-513-001",
            "RE-500-001",
            "RE-505-001-B1-X",
            "RE-505-001-",
        ] {
            let err = parse_project_code(bad).unwrap_err();
            assert!(
                matches!(err, CoreError::MalformedCode { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_new_validates_fields() {
        assert!(ProjectCode::new(TypePrefix::residential(), 2025, 0, 1, None).is_err());
        assert!(ProjectCode::new(TypePrefix::residential(), 2025, 13, 1, None).is_err());
        assert!(ProjectCode::new(TypePrefix::residential(), 2025, 5, 0, None).is_err());
        assert!(ProjectCode::new(TypePrefix::residential(), 2025, 5, 1000, None).is_err());
        assert!(
            ProjectCode::new(vertical("WN"), 2025, 5, 1, Some("B 1".to_string())).is_err()
        );
    }

    #[test]
    fn test_bucket_prefix() {
        let bucket =
            CodeBucket::for_date(TypePrefix::residential(), NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
        assert_eq!(bucket.prefix(), "RE-505-");
        assert_eq!(bucket.year_digit(), 5);
        assert_eq!(bucket.code(3, None).unwrap().to_string(), "RE-505-003");

        let code = parse_project_code("WN-512-007-B1").unwrap();
        assert_eq!(code.bucket().prefix(), "WN-512-");
    }

    #[test]
    fn test_prefix_for_project() {
        assert_eq!(
            TypePrefix::for_project(ProjectType::Residencial, Some("WN"), None)
                .unwrap()
                .as_str(),
            "RE"
        );
        assert_eq!(
            TypePrefix::for_project(ProjectType::Desarrollo, Some("WN"), Some("Altura"))
                .unwrap()
                .as_str(),
            "WN"
        );
        assert_eq!(
            TypePrefix::for_project(ProjectType::Desarrollo, None, Some("Altura"))
                .unwrap()
                .as_str(),
            "AA"
        );
        assert!(matches!(
            TypePrefix::for_project(ProjectType::Desarrollo, None, None),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert_eq!(
            TypePrefix::for_project(ProjectType::Other, None, Some("Hotel Centro"))
                .unwrap()
                .as_str(),
            "HO"
        );
    }

    #[test]
    fn test_vertical_project_never_gets_residential_prefix() {
        for project_type in [ProjectType::Desarrollo, ProjectType::Other] {
            let derived = TypePrefix::for_project(project_type, None, Some("Rose"));
            assert!(matches!(
                derived,
                Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
            ));

            let configured = TypePrefix::for_project(project_type, Some("RE"), Some("Winston"));
            assert!(configured.is_err());
        }
    }

    #[test]
    fn test_prefix_from_name_folds_accents() {
        assert_eq!(TypePrefix::from_project_name("Ñuñoa").unwrap().as_str(), "NA");
        assert_eq!(TypePrefix::from_project_name("Torre 3 Ébano").unwrap().as_str(), "TO");
        assert_eq!(TypePrefix::from_project_name("x").unwrap().as_str(), "XX");
    }

    #[test]
    fn test_type_prefix_serde_is_validated() {
        let prefix: TypePrefix = serde_json::from_str("\"WN\"").unwrap();
        assert_eq!(prefix.as_str(), "WN");
        assert!(serde_json::from_str::<TypePrefix>("\"wrong\"").is_err());
    }
}
