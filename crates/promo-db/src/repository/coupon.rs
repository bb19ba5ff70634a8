//! # Coupon Repository
//!
//! Lookup and insert for coupon codes. Codes are stored upper-case and the
//! lookups expect an already-normalized code.
//!
//! `current_uses` is written only by the redemption commit.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use promo_core::{CouponCode, Money};

macro_rules! select_coupon {
    () => {
        r#"
        SELECT
            id, campaign_id, code,
            max_uses, current_uses, min_order_cents,
            expires_at, created_at
        FROM coupons
        "#
    };
}

/// A coupon row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRow {
    pub id: String,
    pub campaign_id: String,
    pub code: String,
    pub max_uses: i64,
    pub current_uses: i64,
    pub min_order_cents: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for CouponCode {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        if row.max_uses > 0 && row.current_uses > row.max_uses {
            return Err(DbError::corrupt(
                "Coupon",
                &row.id,
                format!("current_uses {} above max_uses {}", row.current_uses, row.max_uses),
            ));
        }

        Ok(CouponCode {
            id: row.id,
            campaign_id: row.campaign_id,
            code: row.code,
            max_uses: row.max_uses,
            current_uses: row.current_uses,
            min_order_amount: Money::from_cents(row.min_order_cents),
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

pub(crate) async fn insert_coupon(
    conn: &mut SqliteConnection,
    coupon: &CouponCode,
) -> DbResult<()> {
    debug!(
        id = %coupon.id,
        campaign_id = %coupon.campaign_id,
        code = %coupon.code,
        "Inserting coupon"
    );

    sqlx::query(
        r#"
        INSERT INTO coupons (
            id, campaign_id, code,
            max_uses, current_uses, min_order_cents,
            expires_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&coupon.id)
    .bind(&coupon.campaign_id)
    .bind(&coupon.code)
    .bind(coupon.max_uses)
    .bind(coupon.current_uses)
    .bind(coupon.min_order_amount.cents())
    .bind(coupon.expires_at)
    .bind(coupon.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon for an existing campaign.
    pub async fn insert(&self, coupon: &CouponCode) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_coupon(&mut *conn, coupon).await
    }

    /// Gets a coupon by its normalized code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CouponCode>> {
        let row: Option<CouponRow> = sqlx::query_as(concat!(select_coupon!(), "WHERE code = ?1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CouponCode::try_from).transpose()
    }

    /// Checks whether a code is already taken.
    pub async fn code_exists(&self, code: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons WHERE code = ?1")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Gets the canonical (oldest) coupon of a campaign.
    pub async fn get_for_campaign(&self, campaign_id: &str) -> DbResult<Option<CouponCode>> {
        let row: Option<CouponRow> = sqlx::query_as(concat!(
            select_coupon!(),
            "WHERE campaign_id = ?1 ORDER BY created_at ASC, id ASC LIMIT 1"
        ))
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CouponCode::try_from).transpose()
    }
}
