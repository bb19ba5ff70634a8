//! # promo-db: Database Layer for the promotions service
//!
//! This crate provides database access for campaigns, coupons, the order
//! annotation and daily stats. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Promotions Data Flow                             │
//! │                                                                         │
//! │  promo-engine (CheckoutService::apply_coupon)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     promo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CampaignRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │    │ CouponRepo    │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │   schema.sql │  │   │
//! │  │   │ Management    │    │ RedemptionRepo│    │              │  │   │
//! │  │   │               │    │ StatsRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./promo.db")).await?;
//!
//! let campaign = db.campaigns().get_for_seller("seller-1", &id).await?;
//! let swept = db.campaigns().complete_expired(Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::campaign::CampaignRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::{OrderAnnotation, OrderRepository};
pub use repository::redemption::{RedemptionCommit, RedemptionRepository};
pub use repository::stats::StatsRepository;
