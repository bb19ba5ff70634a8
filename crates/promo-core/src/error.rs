//! # Error Types
//!
//! Domain-specific error types for promo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  promo-core errors (this file)                                         │
//! │  ├── CoreError        - Lifecycle violations                           │
//! │  └── ValidationError  - Campaign/coupon input failures                 │
//! │                                                                         │
//! │  promo-core coupon module                                              │
//! │  └── CouponRejection  - Why a code cannot be used right now            │
//! │                                                                         │
//! │  promo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  promo-engine errors                                                   │
//! │  └── EngineError      - What callers of the services see               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError ← DbError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::lifecycle::LifecycleState;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The lifecycle table does not allow this move.
    ///
    /// ## When This Occurs
    /// - Reactivating a completed or cancelled campaign
    /// - Completing a campaign that never went live
    /// - Scheduling a draft whose start date has already passed
    #[error("Cannot move campaign from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for campaign and coupon creation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad coupon characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., coupon code already taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// End date is not after start date.
    #[error("end date must be after start date")]
    InvalidDateRange,
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub(crate) fn out_of_range(field: &str, min: i64, max: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        }
    }
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
    fn test_transition_message() {
        let err = CoreError::InvalidTransition {
            from: LifecycleState::Completed,
            to: LifecycleState::Active,
        };
        assert_eq!(
            err.to_string(),
            "Cannot move campaign from completed to active"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("name");
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");

        assert_eq!(
            ValidationError::InvalidDateRange.to_string(),
            "end date must be after start date"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::must_be_positive("budget").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
