//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  └── ValidationError  - Malformed item / page request                  │
//! │                                                                         │
//! │  catalog-db errors (separate crate)                                    │
//! │  └── DbError          - Store failures, NotFound, wraps validation     │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::Validation → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation always runs before the store is touched, so a
//! `ValidationError` guarantees nothing was written.

use thiserror::Error;

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "available_stock".to_string(),
            min: 0,
            max: 10,
        };
        assert_eq!(err.to_string(), "available_stock must be between 0 and 10");
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::MustBePositive {
            field: "catalog_brand_id".to_string(),
        };
        assert_eq!(err.field(), "catalog_brand_id");
    }
}
