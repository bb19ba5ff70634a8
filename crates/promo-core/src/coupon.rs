//! # Coupon Checks
//!
//! Everything about a coupon that can be decided without touching storage:
//! applicability against its campaign, code normalization and code generation.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. code non-empty            EmptyCode           ┐ need the store,    │
//! │  2. code exists               NotFound            ┘ run by the engine  │
//! │  3. campaign owned by seller  WrongShop           ┐                    │
//! │  4. campaign status active    CampaignNotActive   │                    │
//! │  5. now inside window         NotStarted/Expired  │ check_applicability│
//! │  6. now <= expires_at         CouponExpired       │ (this module)      │
//! │  7. uses left                 UsageLimitReached   │                    │
//! │  8. order >= minimum          MinimumNotMet       ┘                    │
//! │                                                                         │
//! │  First failure wins: structural checks before state before amounts.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Campaign, CampaignStatus, CouponCode};

/// Characters used for the random part of generated codes.
///
/// No I, O, 0 or 1: they are easy to misread on a receipt.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the prefix derived from the campaign name.
pub const CODE_PREFIX_LEN: usize = 4;

/// Length of the random suffix.
pub const CODE_SUFFIX_LEN: usize = 5;

/// Bounds for seller-supplied codes, after normalization.
pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 32;

// =============================================================================
// Rejection Reasons
// =============================================================================

/// Why a coupon cannot be used right now.
///
/// Every variant carries a message a buyer can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CouponRejection {
    #[error("Please enter a coupon code")]
    EmptyCode,

    #[error("Coupon code not found")]
    NotFound,

    #[error("This coupon is not valid for this shop")]
    WrongShop,

    #[error("This promotion is not currently running")]
    CampaignNotActive,

    #[error("This promotion has not started yet")]
    NotStarted,

    #[error("This promotion has ended")]
    Expired,

    #[error("This coupon has expired")]
    CouponExpired,

    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,

    #[error("Minimum order amount of {minimum} not met")]
    MinimumNotMet { minimum: Money },
}

impl CouponRejection {
    /// Stable machine-readable code for clients.
    pub const fn code(&self) -> &'static str {
        match self {
            CouponRejection::EmptyCode => "empty_code",
            CouponRejection::NotFound => "not_found",
            CouponRejection::WrongShop => "wrong_shop",
            CouponRejection::CampaignNotActive => "campaign_not_active",
            CouponRejection::NotStarted => "not_started",
            CouponRejection::Expired => "expired",
            CouponRejection::CouponExpired => "coupon_expired",
            CouponRejection::UsageLimitReached => "usage_limit_reached",
            CouponRejection::MinimumNotMet { .. } => "minimum_not_met",
        }
    }
}

// =============================================================================
// Applicability
// =============================================================================

/// Runs checks 3 through 8 against an already-loaded coupon and campaign.
pub fn check_applicability(
    coupon: &CouponCode,
    campaign: &Campaign,
    seller_id: &str,
    order_amount: Money,
    now: DateTime<Utc>,
) -> Result<(), CouponRejection> {
    if campaign.seller_id != seller_id {
        return Err(CouponRejection::WrongShop);
    }

    if campaign.status != CampaignStatus::Active {
        return Err(CouponRejection::CampaignNotActive);
    }

    if now < campaign.start_date {
        return Err(CouponRejection::NotStarted);
    }
    if now > campaign.end_date {
        return Err(CouponRejection::Expired);
    }

    if now > coupon.expires_at {
        return Err(CouponRejection::CouponExpired);
    }

    if !coupon.has_uses_left() {
        return Err(CouponRejection::UsageLimitReached);
    }

    if order_amount < coupon.min_order_amount {
        return Err(CouponRejection::MinimumNotMet {
            minimum: coupon.min_order_amount,
        });
    }

    Ok(())
}

/// Outcome of validating a code, shaped for the checkout page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponValidation {
    pub valid: bool,
    pub coupon: Option<CouponCode>,
    pub campaign: Option<Campaign>,
    /// Buyer-facing message when `valid` is false.
    pub reason: Option<String>,
    /// Stable code matching `reason`.
    pub reason_code: Option<String>,
}

impl CouponValidation {
    pub fn accepted(coupon: CouponCode, campaign: Campaign) -> Self {
        CouponValidation {
            valid: true,
            coupon: Some(coupon),
            campaign: Some(campaign),
            reason: None,
            reason_code: None,
        }
    }

    pub fn rejected(rejection: &CouponRejection) -> Self {
        CouponValidation {
            valid: false,
            coupon: None,
            campaign: None,
            reason: Some(rejection.to_string()),
            reason_code: Some(rejection.code().to_string()),
        }
    }
}

// =============================================================================
// Codes
// =============================================================================

/// Canonical form of a code: trimmed and upper-cased.
#[inline]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Builds a code such as `SPRI-7KQ2M` for a campaign name.
///
/// The prefix is the first letters/digits of the name, upper-cased, padded
/// with random alphabet characters when the name has fewer than four.
pub fn generate_code<R: Rng + ?Sized>(campaign_name: &str, rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_PREFIX_LEN + 1 + CODE_SUFFIX_LEN);

    code.extend(
        campaign_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .take(CODE_PREFIX_LEN),
    );
    while code.len() < CODE_PREFIX_LEN {
        code.push(random_char(rng));
    }

    code.push('-');
    for _ in 0..CODE_SUFFIX_LEN {
        code.push(random_char(rng));
    }

    code
}

fn random_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountRate;
    use crate::types::CampaignKind;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture(now: DateTime<Utc>) -> (CouponCode, Campaign) {
        let campaign = Campaign::new(
            "seller-1",
            "Spring Sale",
            CampaignKind::Percentage {
                rate: DiscountRate::from_percent(10),
            },
            Money::from_cents(100_000),
            now - Duration::days(1),
            now + Duration::days(10),
            now,
        );
        let coupon = CouponCode {
            id: "cp-1".into(),
            campaign_id: campaign.id.clone(),
            code: "SPRI-ABCDE".into(),
            max_uses: 10,
            current_uses: 0,
            min_order_amount: Money::from_cents(2000),
            expires_at: now + Duration::days(5),
            created_at: now,
        };
        (coupon, campaign)
    }

    #[test]
    fn test_valid_coupon_passes() {
        let now = Utc::now();
        let (coupon, campaign) = fixture(now);
        let result =
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(2000), now);
        assert!(result.is_ok());
    }

    #[test]
    fn test_usage_limit_reached() {
        let now = Utc::now();
        let (mut coupon, campaign) = fixture(now);
        coupon.max_uses = 1;
        coupon.current_uses = 1;
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now),
            Err(CouponRejection::UsageLimitReached)
        );
    }

    #[test]
    fn test_wrong_shop_beats_every_other_failure() {
        let now = Utc::now();
        let (mut coupon, mut campaign) = fixture(now);
        campaign.status = CampaignStatus::Paused;
        coupon.max_uses = 1;
        coupon.current_uses = 1;
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-2", Money::zero(), now),
            Err(CouponRejection::WrongShop)
        );
    }

    #[test]
    fn test_status_checked_before_window() {
        let now = Utc::now();
        let (coupon, mut campaign) = fixture(now);
        campaign.status = CampaignStatus::Completed;
        campaign.end_date = now - Duration::hours(1);
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now),
            Err(CouponRejection::CampaignNotActive)
        );
    }

    #[test]
    fn test_window_checks() {
        let now = Utc::now();
        let (coupon, mut campaign) = fixture(now);

        campaign.start_date = now + Duration::hours(1);
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now),
            Err(CouponRejection::NotStarted)
        );

        campaign.start_date = now - Duration::days(2);
        campaign.end_date = now - Duration::days(1);
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let (mut coupon, mut campaign) = fixture(now);
        campaign.start_date = now;
        campaign.end_date = now;
        coupon.expires_at = now;
        let result =
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now);
        assert!(result.is_ok());
    }

    #[test]
    fn test_coupon_expiry_independent_of_window() {
        let now = Utc::now();
        let (mut coupon, campaign) = fixture(now);
        coupon.expires_at = now - Duration::seconds(1);
        assert_eq!(
            check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(5000), now),
            Err(CouponRejection::CouponExpired)
        );
    }

    #[test]
    fn test_minimum_not_met() {
        let now = Utc::now();
        let (coupon, campaign) = fixture(now);
        let err = check_applicability(&coupon, &campaign, "seller-1", Money::from_cents(1999), now)
            .unwrap_err();
        assert_eq!(
            err,
            CouponRejection::MinimumNotMet {
                minimum: Money::from_cents(2000)
            }
        );
        assert_eq!(err.to_string(), "Minimum order amount of $20.00 not met");
        assert_eq!(err.code(), "minimum_not_met");
    }

    #[test]
    fn test_rejection_messages_are_distinct() {
        let all = [
            CouponRejection::EmptyCode,
            CouponRejection::NotFound,
            CouponRejection::WrongShop,
            CouponRejection::CampaignNotActive,
            CouponRejection::NotStarted,
            CouponRejection::Expired,
            CouponRejection::CouponExpired,
            CouponRejection::UsageLimitReached,
            CouponRejection::MinimumNotMet {
                minimum: Money::from_cents(100),
            },
        ];
        let mut messages: Vec<String> = all.iter().map(|r| r.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), all.len());
    }

    #[test]
    fn test_validation_dto() {
        let dto = CouponValidation::rejected(&CouponRejection::UsageLimitReached);
        assert!(!dto.valid);
        assert_eq!(dto.reason_code.as_deref(), Some("usage_limit_reached"));
        assert!(dto.coupon.is_none());
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  spri-abcde "), "SPRI-ABCDE");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn test_generate_code_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = generate_code("Spring Sale", &mut rng);

        assert_eq!(code.len(), 10);
        assert!(code.starts_with("SPRI-"));
        assert!(code[5..].bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_code_pads_short_names() {
        let mut rng = StdRng::seed_from_u64(42);
        let code = generate_code("é!", &mut rng);

        assert_eq!(code.len(), 10);
        assert_eq!(&code[4..5], "-");
        let random: Vec<u8> = code.bytes().filter(|b| *b != b'-').collect();
        assert!(random.iter().all(|b| CODE_ALPHABET.contains(b)));
    }

    #[test]
    fn test_alphabet_has_no_ambiguous_characters() {
        for c in [b'I', b'O', b'0', b'1'] {
            assert!(!CODE_ALPHABET.contains(&c));
        }
    }
}
