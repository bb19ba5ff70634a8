//! # Checkout Service
//!
//! Coupon validation and redemption for the buyer's checkout.
//!
//! ## Redemption Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_coupon(code, order_id, amount, items)                            │
//! │       │                                                                 │
//! │       ├─ load order → seller                       missing → NotFound   │
//! │       │                                                                 │
//! │       │  ┌──────────────── attempt 1..=max ─────────────────────────┐   │
//! │       │  │ check_coupon(code, seller, amount)   → CouponInvalid     │   │
//! │       │  │ calculate_discount(campaign, …)      → NoDiscount-       │   │
//! │       │  │                                        Applicable        │   │
//! │       │  │ redemptions().commit(…)                                  │   │
//! │       │  │     Conflict ──► next attempt (re-validate, never a      │   │
//! │       │  │                  blind retry of the increment)           │   │
//! │       │  └──────────────────────────────────────────────────────────┘   │
//! │       │                              all attempts lost → Redemption-    │
//! │       │                                                  Conflict       │
//! │       ├─ annotate order          (best effort, warn on failure)         │
//! │       ├─ check_and_enforce_budget (best effort, warn on failure)        │
//! │       ▼                                                                 │
//! │  Redemption { discount, budget }                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use ts_rs::TS;

use promo_core::budget;
use promo_core::coupon::{check_applicability, normalize_code};
use promo_core::discount::calculate_discount;
use promo_core::{
    BudgetStatus, Campaign, CouponCode, CouponRejection, CouponValidation, DiscountResult, Money,
    OrderItem,
};
use promo_db::{Database, DbError, RedemptionCommit};

use crate::budget::BudgetEnforcer;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// A coupon that passed every check, with its campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCoupon {
    pub coupon: CouponCode,
    pub campaign: Campaign,
}

/// The outcome of a committed redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Redemption {
    pub order_id: String,
    pub coupon_code: String,
    pub campaign_id: String,
    pub discount: DiscountResult,
    /// Campaign budget right after this redemption.
    pub budget: BudgetStatus,
}

/// Buyer-facing coupon operations.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    config: Arc<EngineConfig>,
    budget: BudgetEnforcer,
}

impl CheckoutService {
    pub fn new(db: Database, config: Arc<EngineConfig>) -> Self {
        let budget = BudgetEnforcer::new(db.clone());
        CheckoutService { db, config, budget }
    }

    /// Runs every coupon check and returns the coupon with its campaign.
    ///
    /// Checks short-circuit in a fixed order; the first failing one is
    /// returned as `EngineError::CouponInvalid`.
    pub async fn check_coupon(
        &self,
        code: &str,
        seller_id: &str,
        order_amount: Money,
    ) -> EngineResult<ValidCoupon> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(CouponRejection::EmptyCode.into());
        }

        let coupon = self
            .db
            .coupons()
            .get_by_code(&code)
            .await?
            .ok_or(CouponRejection::NotFound)?;

        // Cascading deletes make a dangling coupon unlikely; treat it as unknown
        let campaign = self
            .db
            .campaigns()
            .get_by_id(&coupon.campaign_id)
            .await?
            .ok_or(CouponRejection::NotFound)?;

        check_applicability(&coupon, &campaign, seller_id, order_amount, Utc::now())?;

        Ok(ValidCoupon { coupon, campaign })
    }

    /// Validates a code for display at checkout.
    ///
    /// Rejections are part of the result; only store failures are errors.
    pub async fn validate_coupon(
        &self,
        code: &str,
        seller_id: &str,
        order_amount: Money,
    ) -> EngineResult<CouponValidation> {
        match self.check_coupon(code, seller_id, order_amount).await {
            Ok(valid) => Ok(CouponValidation::accepted(valid.coupon, valid.campaign)),
            Err(EngineError::CouponInvalid(rejection)) => {
                Ok(CouponValidation::rejected(&rejection))
            }
            Err(e) => Err(e),
        }
    }

    /// Applies a coupon to an order.
    ///
    /// ## Returns
    /// * `Ok(Redemption)` - usage, spend and the daily stat were committed
    /// * `Err(NotFound)` - unknown order
    /// * `Err(CouponInvalid)` - a check failed, possibly on a re-validation
    ///   after losing a race
    /// * `Err(NoDiscountApplicable)` - the campaign grants nothing here
    /// * `Err(RedemptionConflict)` - every attempt lost a race
    #[instrument(skip(self, items), fields(items = items.len()), err)]
    pub async fn apply_coupon(
        &self,
        code: &str,
        order_id: &str,
        order_amount: Money,
        items: &[OrderItem],
    ) -> EngineResult<Redemption> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Order", order_id))?;

        let attempts = self.config.max_redemption_attempts.max(1);
        for attempt in 1..=attempts {
            let ValidCoupon { coupon, campaign } = self
                .check_coupon(code, &order.seller_id, order_amount)
                .await?;

            let discount = calculate_discount(&campaign, order_amount, items);
            if !discount.discount_amount.is_positive() {
                return Err(EngineError::NoDiscountApplicable);
            }

            let commit = RedemptionCommit {
                coupon_id: coupon.id.clone(),
                campaign_id: campaign.id.clone(),
                discount: discount.discount_amount,
                revenue: discount.discounted_total,
                redeemed_at: Utc::now(),
            };

            match self.db.redemptions().commit(&commit).await {
                Ok(()) => {
                    info!(
                        order_id = %order_id,
                        coupon_code = %coupon.code,
                        campaign_id = %campaign.id,
                        discount = %discount.discount_amount,
                        attempt,
                        "Coupon redeemed"
                    );
                    return Ok(self.finish(order_id, coupon, campaign, discount).await);
                }
                Err(DbError::Conflict(reason)) => {
                    warn!(attempt, %reason, "Redemption lost a race, re-validating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::RedemptionConflict { attempts })
    }

    /// Post-commit steps. Neither may undo or fail the redemption.
    async fn finish(
        &self,
        order_id: &str,
        coupon: CouponCode,
        campaign: Campaign,
        discount: DiscountResult,
    ) -> Redemption {
        if let Err(e) = self
            .db
            .orders()
            .annotate(order_id, &coupon.code, discount.discount_amount, Utc::now())
            .await
        {
            warn!(?e, order_id = %order_id, "Failed to annotate order with discount");
        }

        let budget = match self.budget.check_and_enforce_budget(&campaign.id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(?e, campaign_id = %campaign.id, "Post-redemption budget check failed");
                let mut after = campaign.clone();
                after.spent += discount.discount_amount;
                budget::evaluate(&after)
            }
        };

        Redemption {
            order_id: order_id.to_string(),
            coupon_code: coupon.code,
            campaign_id: campaign.id,
            discount,
            budget,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
