//! Per-day spend series. Rows are written by the redemption commit.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::DbResult;
use promo_core::{DailyCampaignStat, Money};

#[derive(Debug, Clone, sqlx::FromRow)]
struct DailyStatRow {
    campaign_id: String,
    day: NaiveDate,
    spend_cents: i64,
    conversions: i64,
    revenue_cents: i64,
}

impl From<DailyStatRow> for DailyCampaignStat {
    fn from(row: DailyStatRow) -> Self {
        DailyCampaignStat {
            campaign_id: row.campaign_id,
            day: row.day,
            spend: Money::from_cents(row.spend_cents),
            conversions: row.conversions,
            revenue: Money::from_cents(row.revenue_cents),
        }
    }
}

/// Repository for daily campaign stats.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// All daily buckets of a campaign, oldest day first.
    pub async fn daily_for_campaign(&self, campaign_id: &str) -> DbResult<Vec<DailyCampaignStat>> {
        let rows: Vec<DailyStatRow> = sqlx::query_as(
            r#"
            SELECT campaign_id, day, spend_cents, conversions, revenue_cents
            FROM campaign_daily_stats
            WHERE campaign_id = ?1
            ORDER BY day ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DailyCampaignStat::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::redemption::RedemptionCommit;
    use crate::repository::test_support;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_days_are_bucketed_and_ordered() {
        let db = test_support::database().await;
        let now = Utc::now();
        let campaign = test_support::campaign("seller-1", now);
        let coupon = test_support::coupon(&campaign, "DAYS-23456", 0);
        db.campaigns()
            .create(&campaign, Some(&coupon))
            .await
            .unwrap();

        for (offset, cents) in [(0, 300), (-1, 200), (0, 100)] {
            let commit = RedemptionCommit {
                coupon_id: coupon.id.clone(),
                campaign_id: campaign.id.clone(),
                discount: Money::from_cents(cents),
                revenue: Money::from_cents(cents * 4),
                redeemed_at: now + Duration::days(offset),
            };
            db.redemptions().commit(&commit).await.unwrap();
        }

        let days = db.stats().daily_for_campaign(&campaign.id).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, (now - Duration::days(1)).date_naive());
        assert_eq!(days[0].spend, Money::from_cents(200));
        assert_eq!(days[1].spend, Money::from_cents(400));
        assert_eq!(days[1].conversions, 2);

        assert!(db
            .stats()
            .daily_for_campaign("other")
            .await
            .unwrap()
            .is_empty());
    }
}
