//! # promo-engine: Promotion Services
//!
//! Orchestrates the pure rules of `promo-core` over the storage of `promo-db`.
//! Every read-decide-write sequence of the promotions domain lives here.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Promotion Services                               │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    PromoEngine (facade)                          │  │
//! │  │                                                                  │  │
//! │  │  Holds the Database handle and EngineConfig                      │  │
//! │  │  Hands out cheap per-call service values                         │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │      ┌────────────────────────┼──────────────────────┐                 │
//! │      ▼                        ▼                      ▼                  │
//! │  ┌────────────────┐  ┌─────────────────┐  ┌──────────────────────┐     │
//! │  │CampaignService │  │ CheckoutService │  │   BudgetEnforcer     │     │
//! │  │                │  │                 │  │                      │     │
//! │  │ create         │  │ validate_coupon │  │ check_and_enforce    │     │
//! │  │ transitions    │  │ apply_coupon ───┼─►│   _budget            │     │
//! │  │ reads          │  │  (retry on      │  │                      │     │
//! │  │ telemetry      │  │   conflict)     │  │                      │     │
//! │  │ performance    │  │                 │  │                      │     │
//! │  └────────────────┘  └─────────────────┘  └──────────────────────┘     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Sweeper: interval loop, expired → completed, due → active,     │   │
//! │  │  exhausted → completed. Spawned by the promo-sweeper binary.    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`campaigns`] - Campaign creation, lifecycle, reads, telemetry, performance
//! - [`checkout`] - Coupon validation and redemption
//! - [`budget`] - Budget enforcement
//! - [`sweeper`] - Scheduled bulk transitions
//! - [`config`] - Engine configuration
//! - [`error`] - Engine error types
//!
//! ## Usage
//! ```rust,ignore
//! use promo_db::{Database, DbConfig};
//! use promo_engine::{EngineConfig, PromoEngine};
//!
//! let db = Database::new(DbConfig::new("./promo.db")).await?;
//! let engine = PromoEngine::new(db, EngineConfig::default());
//!
//! let redemption = engine
//!     .checkout()
//!     .apply_coupon("SPRI-7KQ2M", &order_id, order_amount, &items)
//!     .await?;
//! ```

use std::sync::Arc;

use promo_db::Database;

pub mod budget;
pub mod campaigns;
pub mod checkout;
pub mod config;
pub mod error;
pub mod sweeper;

pub use budget::BudgetEnforcer;
pub use campaigns::{CampaignPerformance, CampaignService, CampaignView, CreatedCampaign};
pub use checkout::{CheckoutService, Redemption, ValidCoupon};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use sweeper::{SweepReport, Sweeper, SweeperHandle};

/// Entry point to the promotion services.
///
/// Cheap to clone. Services are created per call and share the pool.
#[derive(Debug, Clone)]
pub struct PromoEngine {
    db: Database,
    config: Arc<EngineConfig>,
}

impl PromoEngine {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        PromoEngine {
            db,
            config: Arc::new(config),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seller-facing campaign operations.
    pub fn campaigns(&self) -> CampaignService {
        CampaignService::new(self.db.clone(), Arc::clone(&self.config))
    }

    /// Buyer-facing coupon operations.
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone(), Arc::clone(&self.config))
    }

    pub fn budget(&self) -> BudgetEnforcer {
        BudgetEnforcer::new(self.db.clone())
    }

    /// Builds a sweeper using the configured interval. Spawn `run` on the runtime.
    pub fn sweeper(&self) -> (Sweeper, SweeperHandle) {
        Sweeper::new(self.db.clone(), self.config.sweep_interval)
    }
}
