//! # promo-core: Pure Promotional Pricing Logic
//!
//! This crate is the **heart** of the promotions system. It decides what a
//! campaign is allowed to do and what discount it grants, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Promotions Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Checkout flow / Seller campaign management             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      promo-engine (validator, redemption, budgets, sweeps)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ promo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ lifecycle │  │ discount  │  │  coupon   │  │ analytics │  │   │
//! │  │   │   FSM     │  │ calculator│  │  checks   │  │  budget   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   promo-db (SQLite layer)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Campaign, coupon, order and result types
//! - [`money`] - Money type with integer arithmetic and discount rates
//! - [`lifecycle`] - Observed status projection and transition table
//! - [`discount`] - Per-type discount calculation
//! - [`coupon`] - Coupon applicability checks and code generation
//! - [`budget`] - Remaining budget math
//! - [`analytics`] - Performance ratios
//! - [`validation`] - Campaign creation input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use promo_core::discount::calculate_discount;
//! use promo_core::money::{DiscountRate, Money};
//! use promo_core::types::{Campaign, CampaignKind};
//!
//! let now = Utc::now();
//! let campaign = Campaign::new(
//!     "seller-1",
//!     "Autumn Sale",
//!     CampaignKind::Percentage { rate: DiscountRate::from_percent(20) },
//!     Money::from_cents(100_000),
//!     now - Duration::days(1),
//!     now + Duration::days(7),
//!     now,
//! );
//!
//! let result = calculate_discount(&campaign, Money::from_cents(5_000), &[]);
//! assert_eq!(result.discount_amount, Money::from_cents(1_000));
//! assert_eq!(result.discounted_total, Money::from_cents(4_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod budget;
pub mod coupon;
pub mod discount;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::CampaignMetrics;
pub use budget::BudgetStatus;
pub use coupon::{CouponRejection, CouponValidation};
pub use error::{CoreError, ValidationError};
pub use lifecycle::LifecycleState;
pub use money::{DiscountRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest budget a single campaign may carry (100 000.00).
pub const MAX_CAMPAIGN_BUDGET: Money = Money::from_cents(10_000_000);

/// Highest percentage a percentage or flash sale campaign may grant.
///
/// Expressed in basis points: 9000 = 90%.
pub const MAX_DISCOUNT_BPS: u32 = 9_000;

/// Campaign name length bounds, in characters.
pub const MIN_CAMPAIGN_NAME_LEN: usize = 2;
pub const MAX_CAMPAIGN_NAME_LEN: usize = 100;
