//! # Campaign Analytics
//!
//! Reporting ratios derived from raw counters. A zero denominator means
//! "no data yet" and yields zero, never an error.
//!
//! ```text
//! ctr                  = clicks / impressions * 100
//! conversion_rate      = conversions / clicks * 100
//! cost_per_conversion  = spent / conversions
//! roas                 = revenue_generated / spent
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Campaign;

/// Derived performance ratios for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CampaignMetrics {
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub spent: Money,
    pub revenue_generated: Money,
    /// Click-through rate, percent, 2 decimals.
    pub ctr: f64,
    /// Conversions per click, percent, 2 decimals.
    pub conversion_rate: f64,
    pub cost_per_conversion: Money,
    /// Return on ad spend, 2 decimals.
    pub roas: f64,
}

impl CampaignMetrics {
    pub fn from_counters(
        impressions: i64,
        clicks: i64,
        conversions: i64,
        spent: Money,
        revenue_generated: Money,
    ) -> Self {
        CampaignMetrics {
            impressions,
            clicks,
            conversions,
            spent,
            revenue_generated,
            ctr: round2(ratio(clicks, impressions) * 100.0),
            conversion_rate: round2(ratio(conversions, clicks) * 100.0),
            cost_per_conversion: spent.per_unit(conversions),
            roas: round2(ratio(revenue_generated.cents(), spent.cents())),
        }
    }

    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self::from_counters(
            campaign.impressions,
            campaign.clicks,
            campaign.conversions,
            campaign.spent,
            campaign.revenue_generated,
        )
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Rounds half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominators_yield_zero() {
        let m = CampaignMetrics::from_counters(0, 0, 0, Money::zero(), Money::zero());
        assert_eq!(m.ctr, 0.0);
        assert_eq!(m.conversion_rate, 0.0);
        assert_eq!(m.cost_per_conversion, Money::zero());
        assert_eq!(m.roas, 0.0);
    }

    #[test]
    fn test_ratios() {
        let m = CampaignMetrics::from_counters(
            1_000,
            50,
            5,
            Money::from_cents(2_500),
            Money::from_cents(12_500),
        );
        assert_eq!(m.ctr, 5.0);
        assert_eq!(m.conversion_rate, 10.0);
        assert_eq!(m.cost_per_conversion, Money::from_cents(500));
        assert_eq!(m.roas, 5.0);
    }

    #[test]
    fn test_ratios_round_to_two_decimals() {
        let m =
            CampaignMetrics::from_counters(3, 1, 1, Money::from_cents(300), Money::from_cents(100));
        assert_eq!(m.ctr, 33.33);
        assert_eq!(m.roas, 0.33);
    }

    #[test]
    fn test_cost_per_conversion_rounds_half_up() {
        // 1000 / 3 = 333.33 → 333; 1001 / 2 = 500.5 → 501
        let m = CampaignMetrics::from_counters(0, 0, 3, Money::from_cents(1000), Money::zero());
        assert_eq!(m.cost_per_conversion, Money::from_cents(333));
        let m = CampaignMetrics::from_counters(0, 0, 2, Money::from_cents(1001), Money::zero());
        assert_eq!(m.cost_per_conversion, Money::from_cents(501));
    }
}
