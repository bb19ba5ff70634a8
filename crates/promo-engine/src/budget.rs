//! # Budget Enforcer
//!
//! Reports the remaining budget of a campaign and completes active campaigns
//! whose spend has reached the cap.
//!
//! ```text
//! spent >= budget AND status = active  ──►  completed, { false, 0 }
//! otherwise                            ──►  { remaining > 0, remaining }
//! ```
//!
//! No ownership check: this runs after a buyer's redemption, not on behalf
//! of a seller. The force-complete is a guarded update, so concurrent
//! enforcers complete the campaign exactly once.

use chrono::Utc;
use tracing::{info, instrument};

use promo_core::budget;
use promo_core::BudgetStatus;
use promo_db::Database;

use crate::error::{EngineError, EngineResult};

/// Budget checks against stored spend.
#[derive(Debug, Clone)]
pub struct BudgetEnforcer {
    db: Database,
}

impl BudgetEnforcer {
    pub fn new(db: Database) -> Self {
        BudgetEnforcer { db }
    }

    /// Checks the campaign's budget and completes it when exhausted.
    ///
    /// ## Returns
    /// * `Ok(BudgetStatus)` - remaining budget after any enforcement
    /// * `Err(EngineError::NotFound)` - no such campaign
    #[instrument(skip(self), err)]
    pub async fn check_and_enforce_budget(&self, campaign_id: &str) -> EngineResult<BudgetStatus> {
        let campaign = self
            .db
            .campaigns()
            .get_by_id(campaign_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Campaign", campaign_id))?;

        if budget::must_complete(&campaign) {
            let completed = self
                .db
                .campaigns()
                .force_complete_if_exhausted(campaign_id, Utc::now())
                .await?;
            if completed {
                info!(
                    campaign_id = %campaign_id,
                    spent = %campaign.spent,
                    budget = %campaign.budget,
                    "Budget exhausted"
                );
            }
            return Ok(BudgetStatus::exhausted());
        }

        Ok(budget::evaluate(&campaign))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use promo_core::{CampaignStatus, Money};
    use promo_db::RedemptionCommit;

    async fn spend(engine: &crate::PromoEngine, campaign_id: &str, cents: i64) {
        let coupon = engine
            .database()
            .coupons()
            .get_for_campaign(campaign_id)
            .await
            .unwrap()
            .unwrap();
        engine
            .database()
            .redemptions()
            .commit(&RedemptionCommit {
                coupon_id: coupon.id,
                campaign_id: campaign_id.to_string(),
                discount: Money::from_cents(cents),
                revenue: Money::from_cents(cents * 4),
                redeemed_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_within_budget_reports_remaining() {
        let engine = test_support::engine().await;
        let created = engine
            .campaigns()
            .create_campaign(
                "seller-1",
                test_support::request(test_support::percentage(20), 10_000, "BUDG-0001", 0),
            )
            .await
            .unwrap();
        spend(&engine, &created.campaign.id, 2_500).await;

        let status = engine
            .budget()
            .check_and_enforce_budget(&created.campaign.id)
            .await
            .unwrap();
        assert!(status.within_budget);
        assert_eq!(status.remaining, Money::from_cents(7_500));
    }

    #[tokio::test]
    async fn test_exhausted_campaign_is_completed_once() {
        let engine = test_support::engine().await;
        let created = engine
            .campaigns()
            .create_campaign(
                "seller-1",
                test_support::request(test_support::percentage(20), 10_000, "BUDG-0002", 0),
            )
            .await
            .unwrap();
        spend(&engine, &created.campaign.id, 10_000).await;

        let status = engine
            .budget()
            .check_and_enforce_budget(&created.campaign.id)
            .await
            .unwrap();
        assert_eq!(status, BudgetStatus::exhausted());

        let campaign = engine
            .database()
            .campaigns()
            .get_by_id(&created.campaign.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(campaign.status, CampaignStatus::Completed);

        // Already completed: still reported as exhausted, nothing to force
        let again = engine
            .budget()
            .check_and_enforce_budget(&created.campaign.id)
            .await
            .unwrap();
        assert_eq!(again, BudgetStatus::exhausted());
    }

    #[tokio::test]
    async fn test_missing_campaign() {
        let engine = test_support::engine().await;
        let err = engine
            .budget()
            .check_and_enforce_budget("missing")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
