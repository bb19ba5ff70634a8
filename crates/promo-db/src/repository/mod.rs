//! # Repository Module
//!
//! Database repository implementations for the promotions service.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  promo-engine service                                                  │
//! │       │                                                                 │
//! │       │  db.coupons().get_by_code("SPRI-7KQ2M")                        │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │  ├── get_by_code(&self, code)                                          │
//! │  ├── get_for_campaign(&self, campaign_id)                              │
//! │  └── insert(&self, coupon)                                             │
//! │       │                                                                 │
//! │       │  SQL Query → *Row (FromRow) → TryFrom → domain type            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Counters are never written read-modify-write: every mutation is a     │
//! │  single guarded UPDATE whose rows_affected says whether it applied.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CampaignRepository`](campaign::CampaignRepository) - Campaign CRUD, transitions, telemetry, sweeps
//! - [`CouponRepository`](coupon::CouponRepository) - Coupon lookup and insert
//! - [`OrderRepository`](order::OrderRepository) - Order read and discount annotation
//! - [`RedemptionRepository`](redemption::RedemptionRepository) - The atomic redemption commit
//! - [`StatsRepository`](stats::StatsRepository) - Per-day spend series

pub mod campaign;
pub mod coupon;
pub mod order;
pub mod redemption;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};
    use promo_core::{Campaign, CampaignKind, CouponCode, DiscountRate, Money};
    use uuid::Uuid;

    use crate::pool::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn campaign(seller_id: &str, now: DateTime<Utc>) -> Campaign {
        Campaign::new(
            seller_id,
            "Spring Sale",
            CampaignKind::Percentage {
                rate: DiscountRate::from_percent(20),
            },
            Money::from_cents(10_000),
            now - Duration::days(1),
            now + Duration::days(7),
            now,
        )
    }

    pub fn coupon(campaign: &Campaign, code: &str, max_uses: i64) -> CouponCode {
        CouponCode {
            id: Uuid::new_v4().to_string(),
            campaign_id: campaign.id.clone(),
            code: code.to_string(),
            max_uses,
            current_uses: 0,
            min_order_amount: Money::zero(),
            expires_at: campaign.end_date,
            created_at: campaign.created_at,
        }
    }
}
