//! Remaining-budget math shared by the enforcer and the sweeper.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Campaign, CampaignStatus};

/// Result of a budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetStatus {
    pub within_budget: bool,
    pub remaining: Money,
}

impl BudgetStatus {
    pub const fn exhausted() -> Self {
        BudgetStatus {
            within_budget: false,
            remaining: Money::zero(),
        }
    }
}

/// Checks whether the campaign has spent its whole budget.
#[inline]
pub fn is_exhausted(campaign: &Campaign) -> bool {
    campaign.spent >= campaign.budget
}

/// Checks whether an exhausted campaign must be forced to completed.
///
/// Only active campaigns are forced; paused or terminal ones are left alone.
#[inline]
pub fn must_complete(campaign: &Campaign) -> bool {
    campaign.status == CampaignStatus::Active && is_exhausted(campaign)
}

/// Reports the remaining budget without changing anything.
pub fn evaluate(campaign: &Campaign) -> BudgetStatus {
    if is_exhausted(campaign) {
        return BudgetStatus::exhausted();
    }

    let remaining = campaign.remaining_budget();
    BudgetStatus {
        within_budget: remaining.is_positive(),
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CampaignKind;
    use chrono::{Duration, Utc};

    fn campaign(budget: i64, spent: i64) -> Campaign {
        let now = Utc::now();
        let mut c = Campaign::new(
            "s1",
            "Budget",
            CampaignKind::FreeShipping,
            Money::from_cents(budget),
            now,
            now + Duration::days(1),
            now,
        );
        c.spent = Money::from_cents(spent);
        c
    }

    #[test]
    fn test_within_budget() {
        let status = evaluate(&campaign(10_000, 9_500));
        assert!(status.within_budget);
        assert_eq!(status.remaining, Money::from_cents(500));
    }

    #[test]
    fn test_exhausted_budget() {
        let c = campaign(10_000, 10_000);
        assert_eq!(evaluate(&c), BudgetStatus::exhausted());
        assert!(must_complete(&c));
    }

    #[test]
    fn test_paused_exhausted_is_not_forced() {
        let mut c = campaign(10_000, 10_000);
        c.status = CampaignStatus::Paused;
        assert!(is_exhausted(&c));
        assert!(!must_complete(&c));
    }
}
