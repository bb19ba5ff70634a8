//! # Campaign Repository
//!
//! Database operations for campaigns.
//!
//! ## Status Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Who Writes `status`                               │
//! │                                                                         │
//! │  transition()                 seller request, guarded on old status     │
//! │  force_complete_if_exhausted  budget enforcer, active + spent>=budget   │
//! │  complete_expired()           sweeper, active + end_date < now          │
//! │  activate_due()               sweeper, draft + window contains now      │
//! │  complete_exhausted()         sweeper, active + spent >= budget         │
//! │                                                                         │
//! │  Every one is a single UPDATE ... WHERE <guard>. Zero rows affected    │
//! │  means the guard no longer held, which for the sweeps is the normal    │
//! │  idempotent no-op.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `spent`, `conversions` and `revenue_generated` are only written by
//! [`RedemptionRepository::commit`](super::redemption::RedemptionRepository::commit).

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::coupon::insert_coupon;
use promo_core::{
    Campaign, CampaignKind, CampaignStatus, CampaignType, CouponCode, DiscountRate, Money,
};

macro_rules! select_campaign {
    () => {
        r#"
        SELECT
            id, seller_id, name,
            campaign_type, discount_rate_bps, discount_amount_cents,
            buy_quantity, get_quantity,
            status, start_date, end_date,
            budget_cents, spent_cents, revenue_generated_cents,
            impressions, clicks, conversions,
            created_at, updated_at
        FROM campaigns
        "#
    };
}

// =============================================================================
// Row Mapping
// =============================================================================

/// A campaign row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub campaign_type: CampaignType,
    pub discount_rate_bps: Option<i64>,
    pub discount_amount_cents: Option<i64>,
    pub buy_quantity: Option<i64>,
    pub get_quantity: Option<i64>,
    pub status: CampaignStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget_cents: i64,
    pub spent_cents: i64,
    pub revenue_generated_cents: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignRow {
    fn required(&self, column: &str, value: Option<i64>) -> DbResult<i64> {
        value.ok_or_else(|| DbError::corrupt("Campaign", &self.id, format!("missing {column}")))
    }

    fn positive_u32(&self, column: &str, value: Option<i64>) -> DbResult<u32> {
        let value = self.required(column, value)?;
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                DbError::corrupt("Campaign", &self.id, format!("{column} out of range: {value}"))
            })
    }

    fn kind(&self) -> DbResult<CampaignKind> {
        let kind = match self.campaign_type {
            CampaignType::Percentage => CampaignKind::Percentage {
                rate: DiscountRate::from_bps(
                    self.positive_u32("discount_rate_bps", self.discount_rate_bps)?,
                ),
            },
            CampaignType::FlashSale => CampaignKind::FlashSale {
                rate: DiscountRate::from_bps(
                    self.positive_u32("discount_rate_bps", self.discount_rate_bps)?,
                ),
            },
            CampaignType::FixedAmount => CampaignKind::FixedAmount {
                amount: Money::from_cents(
                    self.required("discount_amount_cents", self.discount_amount_cents)?,
                ),
            },
            CampaignType::FreeShipping => CampaignKind::FreeShipping,
            CampaignType::BuyXGetY => CampaignKind::BuyXGetY {
                buy: self.positive_u32("buy_quantity", self.buy_quantity)?,
                get: self.positive_u32("get_quantity", self.get_quantity)?,
            },
        };
        Ok(kind)
    }
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = DbError;

    fn try_from(row: CampaignRow) -> DbResult<Self> {
        let kind = row.kind()?;

        if row.spent_cents > row.budget_cents {
            return Err(DbError::corrupt("Campaign", &row.id, "spent exceeds budget"));
        }

        Ok(Campaign {
            id: row.id,
            seller_id: row.seller_id,
            name: row.name,
            kind,
            status: row.status,
            start_date: row.start_date,
            end_date: row.end_date,
            budget: Money::from_cents(row.budget_cents),
            spent: Money::from_cents(row.spent_cents),
            revenue_generated: Money::from_cents(row.revenue_generated_cents),
            impressions: row.impressions,
            clicks: row.clicks,
            conversions: row.conversions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Type parameter columns: (rate_bps, amount_cents, buy, get).
type KindColumns = (Option<i64>, Option<i64>, Option<i64>, Option<i64>);

fn kind_columns(kind: &CampaignKind) -> KindColumns {
    match *kind {
        CampaignKind::Percentage { rate } | CampaignKind::FlashSale { rate } => {
            (Some(i64::from(rate.bps())), None, None, None)
        }
        CampaignKind::FixedAmount { amount } => (None, Some(amount.cents()), None, None),
        CampaignKind::FreeShipping => (None, None, None, None),
        CampaignKind::BuyXGetY { buy, get } => {
            (None, None, Some(i64::from(buy)), Some(i64::from(get)))
        }
    }
}

async fn insert_campaign(conn: &mut SqliteConnection, campaign: &Campaign) -> DbResult<()> {
    let (rate_bps, amount_cents, buy, get) = kind_columns(&campaign.kind);

    sqlx::query(
        r#"
        INSERT INTO campaigns (
            id, seller_id, name,
            campaign_type, discount_rate_bps, discount_amount_cents,
            buy_quantity, get_quantity,
            status, start_date, end_date,
            budget_cents, spent_cents, revenue_generated_cents,
            impressions, clicks, conversions,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6,
            ?7, ?8,
            ?9, ?10, ?11,
            ?12, ?13, ?14,
            ?15, ?16, ?17,
            ?18, ?19
        )
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.seller_id)
    .bind(&campaign.name)
    .bind(campaign.campaign_type())
    .bind(rate_bps)
    .bind(amount_cents)
    .bind(buy)
    .bind(get)
    .bind(campaign.status)
    .bind(campaign.start_date)
    .bind(campaign.end_date)
    .bind(campaign.budget.cents())
    .bind(campaign.spent.cents())
    .bind(campaign.revenue_generated.cents())
    .bind(campaign.impressions)
    .bind(campaign.clicks)
    .bind(campaign.conversions)
    .bind(campaign.created_at)
    .bind(campaign.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for campaign database operations.
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Creates a new CampaignRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CampaignRepository { pool }
    }

    /// Inserts a campaign and, optionally, its coupon in one transaction.
    ///
    /// A taken coupon code surfaces as `DbError::UniqueViolation` on
    /// `coupons.code` and nothing is written.
    pub async fn create(&self, campaign: &Campaign, coupon: Option<&CouponCode>) -> DbResult<()> {
        debug!(
            id = %campaign.id,
            seller_id = %campaign.seller_id,
            campaign_type = %campaign.campaign_type(),
            "Inserting campaign"
        );

        let mut tx = self.pool.begin().await?;

        insert_campaign(&mut *tx, campaign).await?;
        if let Some(coupon) = coupon {
            insert_coupon(&mut *tx, coupon).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets a campaign by ID, regardless of owner.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Campaign>> {
        let row: Option<CampaignRow> =
            sqlx::query_as(concat!(select_campaign!(), "WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Campaign::try_from).transpose()
    }

    /// Gets a campaign only if `seller_id` owns it.
    ///
    /// Foreign and missing campaigns both come back as `None`.
    pub async fn get_for_seller(&self, seller_id: &str, id: &str) -> DbResult<Option<Campaign>> {
        let row: Option<CampaignRow> = sqlx::query_as(concat!(
            select_campaign!(),
            "WHERE id = ?1 AND seller_id = ?2"
        ))
        .bind(id)
        .bind(seller_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Campaign::try_from).transpose()
    }

    /// Lists a seller's campaigns, newest first.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Campaign>> {
        let rows: Vec<CampaignRow> = sqlx::query_as(concat!(
            select_campaign!(),
            "WHERE seller_id = ?1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Campaign::try_from).collect()
    }

    /// Moves a campaign from `from` to `to`.
    ///
    /// Returns `false` when the stored status is no longer `from` (someone
    /// else moved it first), or when `to` is active and the budget is spent.
    /// The caller decides what that means.
    pub async fn transition(
        &self,
        id: &str,
        from: CampaignStatus,
        to: CampaignStatus,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
              AND (?3 != 'active' OR spent_cents < budget_cents)
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        if applied {
            info!(id = %id, from = %from, to = %to, "Campaign status changed");
        }
        Ok(applied)
    }

    /// Completes an active campaign whose spend has reached its budget.
    ///
    /// Returns `true` only for the call that performed the change.
    pub async fn force_complete_if_exhausted(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = 'completed',
                updated_at = ?2
            WHERE id = ?1 AND status = 'active' AND spent_cents >= budget_cents
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        if applied {
            info!(id = %id, "Campaign budget exhausted, completed");
        }
        Ok(applied)
    }

    /// Adds one impression. No-op on terminal or missing campaigns.
    pub async fn record_impression(&self, id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        self.bump_counter("impressions", id, now).await
    }

    /// Adds one click. No-op on terminal or missing campaigns.
    pub async fn record_click(&self, id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        self.bump_counter("clicks", id, now).await
    }

    async fn bump_counter(&self, column: &str, id: &str, now: DateTime<Utc>) -> DbResult<bool> {
        // Column names come from the two callers above, never from input
        let sql = format!(
            "UPDATE campaigns SET {column} = {column} + 1, updated_at = ?2 \
             WHERE id = ?1 AND status NOT IN ('completed', 'cancelled')"
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(
            id = %id,
            counter = column,
            applied = result.rows_affected() > 0,
            "Telemetry recorded"
        );
        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Bulk sweeps
    // -------------------------------------------------------------------------

    /// `active` campaigns past their end date → `completed`.
    pub async fn complete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = 'completed',
                updated_at = ?1
            WHERE status = 'active' AND end_date < ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// `draft` campaigns whose window contains `now` → `active`.
    pub async fn activate_due(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = 'active',
                updated_at = ?1
            WHERE status = 'draft' AND start_date <= ?1 AND end_date >= ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// `active` campaigns whose spend reached the budget → `completed`.
    pub async fn complete_exhausted(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = 'completed',
                updated_at = ?1
            WHERE status = 'active' AND spent_cents >= budget_cents
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_read_back_every_kind() {
        let db = test_support::database().await;
        let now = Utc::now();

        let kinds = [
            CampaignKind::Percentage {
                rate: DiscountRate::from_bps(1250),
            },
            CampaignKind::FixedAmount {
                amount: Money::from_cents(1500),
            },
            CampaignKind::FreeShipping,
            CampaignKind::BuyXGetY { buy: 2, get: 1 },
            CampaignKind::FlashSale {
                rate: DiscountRate::from_percent(40),
            },
        ];

        for kind in kinds {
            let mut campaign = test_support::campaign("seller-1", now);
            campaign.kind = kind;
            db.campaigns().create(&campaign, None).await.unwrap();

            let stored = db
                .campaigns()
                .get_by_id(&campaign.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored, campaign);
        }
    }

    #[tokio::test]
    async fn test_get_for_seller_hides_foreign_campaigns() {
        let db = test_support::database().await;
        let campaign = test_support::campaign("seller-1", Utc::now());
        db.campaigns().create(&campaign, None).await.unwrap();

        let repo = db.campaigns();
        assert!(repo
            .get_for_seller("seller-1", &campaign.id)
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .get_for_seller("seller-2", &campaign.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .get_for_seller("seller-1", "missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_by_seller_newest_first() {
        let db = test_support::database().await;
        let now = Utc::now();

        let older = test_support::campaign("seller-1", now - Duration::hours(2));
        let newer = test_support::campaign("seller-1", now);
        let foreign = test_support::campaign("seller-2", now);
        for c in [&older, &newer, &foreign] {
            db.campaigns().create(c, None).await.unwrap();
        }

        let listed = db.campaigns().list_by_seller("seller-1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
    }

    #[tokio::test]
    async fn test_duplicate_coupon_rolls_back_campaign() {
        let db = test_support::database().await;
        let now = Utc::now();

        let first = test_support::campaign("seller-1", now);
        let coupon = test_support::coupon(&first, "SAVE-20", 0);
        db.campaigns().create(&first, Some(&coupon)).await.unwrap();

        let second = test_support::campaign("seller-1", now);
        let clash = test_support::coupon(&second, "SAVE-20", 0);
        let err = db
            .campaigns()
            .create(&second, Some(&clash))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on("coupons.code"));
        assert!(db
            .campaigns()
            .get_by_id(&second.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_transition_is_guarded_on_old_status() {
        let db = test_support::database().await;
        let now = Utc::now();
        let campaign = test_support::campaign("seller-1", now);
        db.campaigns().create(&campaign, None).await.unwrap();

        let repo = db.campaigns();
        assert!(repo
            .transition(&campaign.id, CampaignStatus::Active, CampaignStatus::Paused, now)
            .await
            .unwrap());
        // Stale expectation: already paused
        assert!(!repo
            .transition(&campaign.id, CampaignStatus::Active, CampaignStatus::Cancelled, now)
            .await
            .unwrap());

        let stored = repo.get_by_id(&campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn test_spent_campaign_cannot_be_reactivated() {
        let db = test_support::database().await;
        let now = Utc::now();
        let mut campaign = test_support::campaign("seller-1", now);
        campaign.status = CampaignStatus::Paused;
        campaign.spent = campaign.budget;
        db.campaigns().create(&campaign, None).await.unwrap();

        let repo = db.campaigns();
        assert!(!repo
            .transition(&campaign.id, CampaignStatus::Paused, CampaignStatus::Active, now)
            .await
            .unwrap());
        assert!(repo
            .transition(&campaign.id, CampaignStatus::Paused, CampaignStatus::Cancelled, now)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_telemetry_skips_terminal_campaigns() {
        let db = test_support::database().await;
        let now = Utc::now();
        let campaign = test_support::campaign("seller-1", now);
        db.campaigns().create(&campaign, None).await.unwrap();
        let repo = db.campaigns();

        assert!(repo.record_impression(&campaign.id, now).await.unwrap());
        assert!(repo.record_impression(&campaign.id, now).await.unwrap());
        assert!(repo.record_click(&campaign.id, now).await.unwrap());

        repo.transition(&campaign.id, CampaignStatus::Active, CampaignStatus::Cancelled, now)
            .await
            .unwrap();
        assert!(!repo.record_click(&campaign.id, now).await.unwrap());

        let stored = repo.get_by_id(&campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.impressions, 2);
        assert_eq!(stored.clicks, 1);
    }

    #[tokio::test]
    async fn test_sweeps_are_idempotent() {
        let db = test_support::database().await;
        let now = Utc::now();
        let repo = db.campaigns();

        let mut expired = test_support::campaign("seller-1", now - Duration::days(10));
        expired.start_date = now - Duration::days(10);
        expired.end_date = now - Duration::days(1);
        repo.create(&expired, None).await.unwrap();

        let mut due = test_support::campaign("seller-1", now);
        due.status = CampaignStatus::Draft;
        repo.create(&due, None).await.unwrap();

        let mut future = test_support::campaign("seller-1", now);
        future.status = CampaignStatus::Draft;
        future.start_date = now + Duration::days(1);
        future.end_date = now + Duration::days(2);
        repo.create(&future, None).await.unwrap();

        assert_eq!(repo.complete_expired(now).await.unwrap(), 1);
        assert_eq!(repo.activate_due(now).await.unwrap(), 1);
        assert_eq!(repo.complete_expired(now).await.unwrap(), 0);
        assert_eq!(repo.activate_due(now).await.unwrap(), 0);

        let status = |id: String| {
            let repo = repo.clone();
            async move { repo.get_by_id(&id).await.unwrap().unwrap().status }
        };
        assert_eq!(status(expired.id.clone()).await, CampaignStatus::Completed);
        assert_eq!(status(due.id.clone()).await, CampaignStatus::Active);
        assert_eq!(status(future.id.clone()).await, CampaignStatus::Draft);
    }

    #[test]
    fn test_row_without_type_parameters_is_corrupt() {
        let now = Utc::now();
        let row = CampaignRow {
            id: "c-1".into(),
            seller_id: "s".into(),
            name: "Broken".into(),
            campaign_type: CampaignType::Percentage,
            discount_rate_bps: None,
            discount_amount_cents: None,
            buy_quantity: None,
            get_quantity: None,
            status: CampaignStatus::Active,
            start_date: now,
            end_date: now + Duration::days(1),
            budget_cents: 100,
            spent_cents: 0,
            revenue_generated_cents: 0,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            created_at: now,
            updated_at: now,
        };

        let err = Campaign::try_from(row.clone()).unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { .. }));

        let negative_buy = CampaignRow {
            campaign_type: CampaignType::BuyXGetY,
            buy_quantity: Some(-1),
            get_quantity: Some(1),
            ..row
        };
        assert!(Campaign::try_from(negative_buy).is_err());
    }
}
