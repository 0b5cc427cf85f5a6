//! # Sequence Derivation
//!
//! Pure half of the sequence allocator: given the latest code already issued
//! in a bucket, compute the next sequence. The database crate serializes
//! read-then-reserve around this function.

use crate::code::{parse_sequence, CodeBucket, MAX_SEQUENCE};
use crate::error::{CoreError, CoreResult};

/// Sequence of a code, read from its third segment.
///
/// ## Example
/// ```rust
/// use cotiza_core::sequence::sequence_of;
///
/// assert_eq!(sequence_of("RE-505-014").unwrap(), 14);
/// assert_eq!(sequence_of("WN-512-007-B1").unwrap(), 7);
/// assert!(sequence_of("RE-505").is_err());
/// ```
pub fn sequence_of(code: &str) -> CoreResult<u16> {
    match code.split('-').nth(2) {
        Some(segment) => parse_sequence(code, segment),
        None => Err(CoreError::malformed(code, "missing sequence segment")),
    }
}

/// Next sequence for a bucket.
///
/// `latest` is the greatest code already issued in the bucket, if any.
///
/// ## Rules
/// - No code yet → 1
/// - Otherwise latest sequence + 1
/// - Past [`MAX_SEQUENCE`] → [`CoreError::SequenceExhausted`]
/// - `latest` outside the bucket → [`CoreError::MalformedCode`]
///
/// ## Example
/// ```rust
/// use cotiza_core::code::{CodeBucket, TypePrefix};
/// use cotiza_core::sequence::next_sequence_after;
///
/// let bucket = CodeBucket::new(TypePrefix::residential(), 2025, 5).unwrap();
/// assert_eq!(next_sequence_after(&bucket, None).unwrap(), 1);
/// assert_eq!(next_sequence_after(&bucket, Some("RE-505-003")).unwrap(), 4);
/// ```
pub fn next_sequence_after(bucket: &CodeBucket, latest: Option<&str>) -> CoreResult<u16> {
    let Some(code) = latest else {
        return Ok(1);
    };

    if !code.starts_with(&bucket.prefix()) {
        return Err(CoreError::malformed(
            code,
            format!("does not belong to bucket {}", bucket),
        ));
    }

    let current = sequence_of(code)?;
    if current >= MAX_SEQUENCE {
        return Err(CoreError::SequenceExhausted {
            bucket: bucket.prefix(),
            max: MAX_SEQUENCE,
        });
    }
    Ok(current + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::TypePrefix;

    fn bucket() -> CodeBucket {
        CodeBucket::new(TypePrefix::residential(), 2025, 5).unwrap()
    }

    #[test]
    fn test_first_code_of_bucket() {
        assert_eq!(next_sequence_after(&bucket(), None).unwrap(), 1);
    }

    #[test]
    fn test_increments_latest() {
        assert_eq!(next_sequence_after(&bucket(), Some("RE-505-001")).unwrap(), 2);
        assert_eq!(next_sequence_after(&bucket(), Some("RE-505-099")).unwrap(), 100);
    }

    #[test]
    fn test_prototype_suffix_is_ignored() {
        let bucket = CodeBucket::new(TypePrefix::new("WN").unwrap(), 2025, 12).unwrap();
        assert_eq!(
            next_sequence_after(&bucket, Some("WN-512-007-B1")).unwrap(),
            8
        );
    }

    #[test]
    fn test_exhausted_bucket() {
        assert_eq!(next_sequence_after(&bucket(), Some("RE-505-998")).unwrap(), 999);

        let err = next_sequence_after(&bucket(), Some("RE-505-999")).unwrap_err();
        match err {
            CoreError::SequenceExhausted { bucket, max } => {
                assert_eq!(bucket, "RE-505-");
                assert_eq!(max, 999);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_latest_from_other_bucket_is_rejected() {
        let err = next_sequence_after(&bucket(), Some("RE-506-004")).unwrap_err();
        assert!(matches!(err, CoreError::MalformedCode { .. }));
    }

    #[test]
    fn test_non_numeric_sequence_is_rejected() {
        assert!(next_sequence_after(&bucket(), Some("RE-505-abc")).is_err());
        assert!(sequence_of("RE-505-").is_err());
    }
}
