//! # Order Repository
//!
//! Orders belong to the order service. This repository reads the three
//! fields promotions need and writes the discount annotation back.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use promo_core::{Money, Order};

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: String,
    seller_id: String,
    total_cents: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            seller_id: row.seller_id,
            total_amount: Money::from_cents(row.total_cents),
        }
    }
}

/// The discount written onto an order after a redemption.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderAnnotation {
    pub coupon_code: Option<String>,
    pub discount_cents: i64,
}

/// Repository for the order fields promotions touch.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT id, seller_id, total_cents FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Order::from))
    }

    /// Records an order mirrored from the order service.
    pub async fn insert(&self, order: &Order, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %order.id, seller_id = %order.seller_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, seller_id, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&order.id)
        .bind(&order.seller_id)
        .bind(order.total_amount.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the applied coupon and discount onto the order.
    pub async fn annotate(
        &self,
        id: &str,
        coupon_code: &str,
        discount: Money,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                coupon_code = ?2,
                discount_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(coupon_code)
        .bind(discount.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        debug!(id = %id, coupon_code = %coupon_code, discount = %discount, "Order annotated");
        Ok(())
    }

    /// Reads back the annotation of an order.
    pub async fn annotation(&self, id: &str) -> DbResult<Option<OrderAnnotation>> {
        let annotation = sqlx::query_as::<_, OrderAnnotation>(
            "SELECT coupon_code, discount_cents FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(annotation)
    }
}
