//! # Campaign Service
//!
//! Seller-facing campaign operations: creation (with an optional coupon),
//! lifecycle transitions, reads, telemetry and performance reports.
//!
//! ## Ownership
//! Every seller-facing call loads the campaign scoped by seller. A campaign
//! that does not exist and one that belongs to someone else are both
//! `NotFound`.
//!
//! ## Transition Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request_transition(seller, id, target)                                 │
//! │       │                                                                 │
//! │       ├─ load (seller scoped) ─────────── missing/foreign → NotFound    │
//! │       ├─ plan_transition(observed, target) ── not allowed → Invalid-    │
//! │       │                                                     Transition  │
//! │       ├─ UPDATE … WHERE status = <status we read>                       │
//! │       │       │                                                         │
//! │       │       └─ 0 rows: someone moved it first, reload and report      │
//! │       │          InvalidTransition from the fresh state                 │
//! │       ▼                                                                 │
//! │  updated campaign                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use ts_rs::TS;
use uuid::Uuid;

use promo_core::budget::is_exhausted;
use promo_core::coupon::{generate_code, normalize_code};
use promo_core::lifecycle::plan_transition;
use promo_core::validation::validate_new_campaign;
use promo_core::{
    Campaign, CampaignMetrics, CampaignStatus, CouponCode, DailyCampaignStat, LifecycleState,
    Money, NewCampaign, NewCoupon, ValidationError,
};
use promo_db::{Database, DbError};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Column reported by the store when a coupon code is taken.
const COUPON_CODE_COLUMN: &str = "coupons.code";

// =============================================================================
// DTOs
// =============================================================================

/// A campaign together with the coupon created alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatedCampaign {
    pub campaign: Campaign,
    pub coupon: Option<CouponCode>,
}

/// A campaign as a seller sees it right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CampaignView {
    pub campaign: Campaign,
    pub observed_status: LifecycleState,
}

impl CampaignView {
    fn at(campaign: Campaign, now: DateTime<Utc>) -> Self {
        let observed_status = campaign.observed_status(now);
        CampaignView {
            campaign,
            observed_status,
        }
    }
}

/// Performance report for the seller dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub observed_status: LifecycleState,
    pub metrics: CampaignMetrics,
    pub remaining_budget: Money,
    /// Oldest day first.
    pub daily: Vec<DailyCampaignStat>,
}

// =============================================================================
// Service
// =============================================================================

/// Seller-facing campaign operations.
#[derive(Debug, Clone)]
pub struct CampaignService {
    db: Database,
    config: Arc<EngineConfig>,
}

impl CampaignService {
    pub fn new(db: Database, config: Arc<EngineConfig>) -> Self {
        CampaignService { db, config }
    }

    /// Creates a campaign and, when requested, its coupon in one transaction.
    ///
    /// The campaign starts `active` when its window has already opened and
    /// `draft` (observed as scheduled) otherwise.
    ///
    /// ## Errors
    /// * `Validation` - bad input, or a supplied coupon code already taken
    /// * `Persistence` - store failure, or no free generated code was found
    #[instrument(skip(self, input), fields(name = %input.name), err)]
    pub async fn create_campaign(
        &self,
        seller_id: &str,
        input: NewCampaign,
    ) -> EngineResult<CreatedCampaign> {
        let name = validate_new_campaign(&input)?;
        let now = Utc::now();

        let campaign = Campaign::new(
            seller_id,
            name,
            input.kind,
            input.budget,
            input.start_date,
            input.end_date,
            now,
        );

        let coupon = match &input.coupon {
            None => {
                self.db.campaigns().create(&campaign, None).await?;
                None
            }
            Some(request) => Some(self.create_with_coupon(&campaign, request, now).await?),
        };

        info!(
            campaign_id = %campaign.id,
            seller_id = %seller_id,
            campaign_type = %campaign.campaign_type(),
            status = %campaign.status,
            "Campaign created"
        );

        Ok(CreatedCampaign { campaign, coupon })
    }

    async fn create_with_coupon(
        &self,
        campaign: &Campaign,
        request: &NewCoupon,
        now: DateTime<Utc>,
    ) -> EngineResult<CouponCode> {
        if let Some(raw) = &request.code {
            let coupon = build_coupon(campaign, request, normalize_code(raw), now);
            return match self.db.campaigns().create(campaign, Some(&coupon)).await {
                Ok(()) => Ok(coupon),
                Err(e) if e.is_unique_violation_on(COUPON_CODE_COLUMN) => {
                    Err(ValidationError::Duplicate {
                        field: "code".to_string(),
                        value: coupon.code,
                    }
                    .into())
                }
                Err(e) => Err(e.into()),
            };
        }

        let mut last_error = None;
        for attempt in 1..=self.config.max_code_attempts {
            let code = generate_code(&campaign.name, &mut rand::thread_rng());
            let coupon = build_coupon(campaign, request, code, now);

            match self.db.campaigns().create(campaign, Some(&coupon)).await {
                Ok(()) => return Ok(coupon),
                Err(e) if e.is_unique_violation_on(COUPON_CODE_COLUMN) => {
                    warn!(
                        attempt,
                        code = %coupon.code,
                        "Generated coupon code taken, regenerating"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::Persistence(last_error.unwrap_or_else(|| {
            DbError::duplicate(COUPON_CODE_COLUMN, "generated")
        })))
    }

    /// Moves a campaign to `target` on behalf of its seller.
    ///
    /// ## Returns
    /// * `Ok(Campaign)` - the campaign as stored after the move
    /// * `Err(NotFound)` - missing or foreign campaign
    /// * `Err(InvalidTransition)` - not allowed, a spent campaign asked to go
    ///   active, or lost a race against another writer (reported against the
    ///   fresh state)
    #[instrument(skip(self), err)]
    pub async fn request_transition(
        &self,
        seller_id: &str,
        campaign_id: &str,
        target: LifecycleState,
    ) -> EngineResult<Campaign> {
        let now = Utc::now();
        let campaign = self.owned(seller_id, campaign_id).await?;

        let next = plan_transition(campaign.status, campaign.start_date, target, now)?;
        if next == CampaignStatus::Active && is_exhausted(&campaign) {
            return Err(EngineError::InvalidTransition {
                from: campaign.observed_status(now),
                to: target,
            });
        }

        let applied = self
            .db
            .campaigns()
            .transition(campaign_id, campaign.status, next, now)
            .await?;

        let stored = self.owned(seller_id, campaign_id).await?;
        if !applied {
            warn!(
                campaign_id = %campaign_id,
                expected = %campaign.status,
                found = %stored.status,
                "Campaign changed during transition"
            );
            return Err(EngineError::InvalidTransition {
                from: stored.observed_status(now),
                to: target,
            });
        }

        Ok(stored)
    }

    /// Gets one of the seller's campaigns.
    pub async fn get_campaign(
        &self,
        seller_id: &str,
        campaign_id: &str,
    ) -> EngineResult<CampaignView> {
        let campaign = self.owned(seller_id, campaign_id).await?;
        Ok(CampaignView::at(campaign, Utc::now()))
    }

    /// Lists the seller's campaigns, newest first.
    pub async fn list_campaigns(&self, seller_id: &str) -> EngineResult<Vec<CampaignView>> {
        let now = Utc::now();
        let campaigns = self.db.campaigns().list_by_seller(seller_id).await?;
        Ok(campaigns
            .into_iter()
            .map(|campaign| CampaignView::at(campaign, now))
            .collect())
    }

    /// Gets the canonical coupon of one of the seller's campaigns.
    pub async fn coupon_for_campaign(
        &self,
        seller_id: &str,
        campaign_id: &str,
    ) -> EngineResult<Option<CouponCode>> {
        let campaign = self.owned(seller_id, campaign_id).await?;
        Ok(self.db.coupons().get_for_campaign(&campaign.id).await?)
    }

    /// Counts an impression. Returns `false` when the campaign is terminal
    /// or unknown, in which case nothing changed.
    pub async fn record_impression(&self, campaign_id: &str) -> EngineResult<bool> {
        Ok(self
            .db
            .campaigns()
            .record_impression(campaign_id, Utc::now())
            .await?)
    }

    /// Counts a click. Same rules as [`Self::record_impression`].
    pub async fn record_click(&self, campaign_id: &str) -> EngineResult<bool> {
        Ok(self
            .db
            .campaigns()
            .record_click(campaign_id, Utc::now())
            .await?)
    }

    /// Builds the performance report of one of the seller's campaigns.
    #[instrument(skip(self), err)]
    pub async fn performance(
        &self,
        seller_id: &str,
        campaign_id: &str,
    ) -> EngineResult<CampaignPerformance> {
        let campaign = self.owned(seller_id, campaign_id).await?;
        let daily = self.db.stats().daily_for_campaign(&campaign.id).await?;

        Ok(CampaignPerformance {
            campaign_id: campaign.id.clone(),
            observed_status: campaign.observed_status(Utc::now()),
            metrics: CampaignMetrics::from_campaign(&campaign),
            remaining_budget: campaign.remaining_budget(),
            daily,
        })
    }

    async fn owned(&self, seller_id: &str, campaign_id: &str) -> EngineResult<Campaign> {
        self.db
            .campaigns()
            .get_for_seller(seller_id, campaign_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Campaign", campaign_id))
    }
}

fn build_coupon(
    campaign: &Campaign,
    request: &NewCoupon,
    code: String,
    now: DateTime<Utc>,
) -> CouponCode {
    CouponCode {
        id: Uuid::new_v4().to_string(),
        campaign_id: campaign.id.clone(),
        code,
        max_uses: request.max_uses,
        current_uses: 0,
        min_order_amount: request.min_order_amount,
        expires_at: request.expires_at.unwrap_or(campaign.end_date),
        created_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
