//! # Redemption Repository
//!
//! The one place where coupon usage and campaign spend change.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ UPDATE coupons   current_uses + 1                                  │
//! │   │    WHERE max_uses = 0 OR current_uses < max_uses   ── 0 rows ─┐     │
//! │   │                                                               │     │
//! │   ├─ UPDATE campaigns spent + d, conversions + 1, revenue + r     │     │
//! │   │    WHERE status = 'active' AND spent + d <= budget ── 0 rows ─┤     │
//! │   │                                                               │     │
//! │   ├─ UPSERT campaign_daily_stats (campaign, day)                  │     │
//! │   │                                                               ▼     │
//! │  COMMIT                                           ROLLBACK + Conflict   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no read-then-write window: the guards are evaluated by SQLite
//! against the row as it is at write time. A `Conflict` means another
//! redemption won the race and the caller must re-validate.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use promo_core::Money;

/// Everything the commit writes, computed before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionCommit {
    pub coupon_id: String,
    pub campaign_id: String,
    /// Added to campaign spend. Already capped at the remaining budget.
    pub discount: Money,
    /// Added to campaign revenue: the order total after the discount.
    pub revenue: Money,
    pub redeemed_at: DateTime<Utc>,
}

/// Repository for the atomic redemption commit.
#[derive(Debug, Clone)]
pub struct RedemptionRepository {
    pool: SqlitePool,
}

impl RedemptionRepository {
    /// Creates a new RedemptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RedemptionRepository { pool }
    }

    /// Applies a redemption in one transaction.
    ///
    /// ## Returns
    /// * `Ok(())` - usage, spend, conversions, revenue and the daily bucket
    ///   were all updated
    /// * `Err(DbError::Conflict)` - a guard failed; nothing was written
    /// * `Err(_)` - any other database failure; nothing was written
    pub async fn commit(&self, redemption: &RedemptionCommit) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let coupon = sqlx::query(
            r#"
            UPDATE coupons SET
                current_uses = current_uses + 1
            WHERE id = ?1 AND (max_uses = 0 OR current_uses < max_uses)
            "#,
        )
        .bind(&redemption.coupon_id)
        .execute(&mut *tx)
        .await?;

        if coupon.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::Conflict(format!(
                "coupon {} has no uses left",
                redemption.coupon_id
            )));
        }

        let campaign = sqlx::query(
            r#"
            UPDATE campaigns SET
                spent_cents = spent_cents + ?2,
                conversions = conversions + 1,
                revenue_generated_cents = revenue_generated_cents + ?3,
                updated_at = ?4
            WHERE id = ?1
              AND status = 'active'
              AND spent_cents + ?2 <= budget_cents
            "#,
        )
        .bind(&redemption.campaign_id)
        .bind(redemption.discount.cents())
        .bind(redemption.revenue.cents())
        .bind(redemption.redeemed_at)
        .execute(&mut *tx)
        .await?;

        if campaign.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::Conflict(format!(
                "campaign {} is no longer active or cannot absorb {}",
                redemption.campaign_id, redemption.discount
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO campaign_daily_stats (campaign_id, day, spend_cents, conversions, revenue_cents)
            VALUES (?1, ?2, ?3, 1, ?4)
            ON CONFLICT (campaign_id, day) DO UPDATE SET
                spend_cents = spend_cents + excluded.spend_cents,
                conversions = conversions + 1,
                revenue_cents = revenue_cents + excluded.revenue_cents
            "#,
        )
        .bind(&redemption.campaign_id)
        .bind(redemption.redeemed_at.date_naive())
        .bind(redemption.discount.cents())
        .bind(redemption.revenue.cents())
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            coupon_id = %redemption.coupon_id,
            campaign_id = %redemption.campaign_id,
            discount = %redemption.discount,
            "Redemption committed"
        );
        Ok(())
    }
}
