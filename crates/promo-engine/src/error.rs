//! # Engine Error Types
//!
//! What callers of the campaign, checkout and budget services see.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Input       │  │     State       │  │      Redemption         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  NotFound       │  │  CouponInvalid          │ │
//! │  │                 │  │  Invalid-       │  │  NoDiscountApplicable   │ │
//! │  │                 │  │   Transition    │  │  RedemptionConflict     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Persistence(DbError) - anything the store reported             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Input and state errors are returned as-is and never retried.          │
//! │  A missing campaign and a campaign owned by someone else are both      │
//! │  NotFound, so ids of other sellers cannot be probed.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use promo_core::{CoreError, CouponRejection, LifecycleState, ValidationError};
use promo_db::DbError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Campaign or coupon input failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // State Errors
    // =========================================================================
    /// The entity does not exist or is not visible to the caller.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The lifecycle table does not allow the requested move.
    #[error("Cannot move campaign from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    // =========================================================================
    // Redemption Errors
    // =========================================================================
    /// The coupon cannot be used for this order right now.
    #[error("{0}")]
    CouponInvalid(#[from] CouponRejection),

    /// The campaign grants no monetary discount for this order.
    #[error("No discount applies to this order")]
    NoDiscountApplicable,

    /// Every attempt lost the race against concurrent redemptions.
    #[error("Redemption did not commit after {attempts} attempts")]
    RedemptionConflict { attempts: u32 },

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// The database reported a failure.
    #[error("Persistence error: {0}")]
    Persistence(DbError),
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::CouponInvalid(_) => "COUPON_INVALID",
            EngineError::NoDiscountApplicable => "NO_DISCOUNT_APPLICABLE",
            EngineError::RedemptionConflict { .. } => "REDEMPTION_CONFLICT",
            EngineError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

/// Store not-found keeps its meaning; everything else is a persistence failure.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            other => EngineError::Persistence(other),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { from, to } => {
                EngineError::InvalidTransition { from, to }
            }
            CoreError::Validation(e) => EngineError::Validation(e),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::Money;

    #[test]
    fn test_db_not_found_stays_not_found() {
        let err: EngineError = DbError::not_found("Order", "o-1").into();
        assert!(matches!(err, EngineError::NotFound { ref entity, .. } if entity == "Order"));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_other_db_errors_are_persistence() {
        let err: EngineError = DbError::Conflict("guard".into()).into();
        assert!(matches!(err, EngineError::Persistence(DbError::Conflict(_))));

        let err: EngineError = DbError::PoolExhausted.into();
        assert_eq!(err.code(), "PERSISTENCE_ERROR");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: EngineError = CoreError::InvalidTransition {
            from: LifecycleState::Completed,
            to: LifecycleState::Active,
        }
        .into();
        assert_eq!(err.to_string(), "Cannot move campaign from completed to active");

        let err: EngineError = CoreError::Validation(ValidationError::InvalidDateRange).into();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_coupon_rejection_message_passes_through() {
        let err: EngineError = CouponRejection::MinimumNotMet {
            minimum: Money::from_cents(2500),
        }
        .into();
        assert_eq!(err.code(), "COUPON_INVALID");
        assert!(err.to_string().starts_with("Minimum order amount of"));
    }
}
