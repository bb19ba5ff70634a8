//! # Validation Module
//!
//! Input rules for campaign and coupon creation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Seller dashboard                                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CampaignService::create_campaign                             │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (spent <= budget, counters >= 0)                │
//! │  ├── UNIQUE coupon code                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use promo_core::validation::{validate_campaign_name, validate_coupon_code};
//!
//! assert!(validate_campaign_name("Spring Sale").is_ok());
//! assert_eq!(validate_coupon_code(" spri-7kq2m ").unwrap(), "SPRI-7KQ2M");
//! ```

use chrono::{DateTime, Utc};

use crate::coupon::{normalize_code, MAX_CODE_LEN, MIN_CODE_LEN};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CampaignKind, NewCampaign, NewCoupon};
use crate::{MAX_CAMPAIGN_BUDGET, MAX_CAMPAIGN_NAME_LEN, MAX_DISCOUNT_BPS, MIN_CAMPAIGN_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Campaign Validators
// =============================================================================

/// Validates a campaign name and returns it trimmed.
///
/// Length is counted in characters, not bytes.
pub fn validate_campaign_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    let len = name.chars().count();
    if len < MIN_CAMPAIGN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: MIN_CAMPAIGN_NAME_LEN,
        });
    }
    if len > MAX_CAMPAIGN_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_CAMPAIGN_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a budget: `0 < budget <= 100 000.00`.
pub fn validate_budget(budget: Money) -> ValidationResult<()> {
    if !budget.is_positive() {
        return Err(ValidationError::must_be_positive("budget"));
    }
    if budget > MAX_CAMPAIGN_BUDGET {
        return Err(ValidationError::out_of_range(
            "budget",
            1,
            MAX_CAMPAIGN_BUDGET.cents(),
        ));
    }
    Ok(())
}

/// Validates that the end date is strictly after the start date.
pub fn validate_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if end <= start {
        return Err(ValidationError::InvalidDateRange);
    }
    Ok(())
}

/// Validates the parameters carried by a campaign kind.
///
/// ## Rules
/// - percentage / flash sale: `0 < rate <= 90%`
/// - fixed amount: `amount > 0`
/// - buy x get y: both at least 1
pub fn validate_kind(kind: &CampaignKind) -> ValidationResult<()> {
    match kind {
        CampaignKind::Percentage { rate } | CampaignKind::FlashSale { rate } => {
            if rate.bps() == 0 || rate.bps() > MAX_DISCOUNT_BPS {
                return Err(ValidationError::out_of_range(
                    "discount_rate_bps",
                    1,
                    i64::from(MAX_DISCOUNT_BPS),
                ));
            }
        }
        CampaignKind::FixedAmount { amount } => {
            if !amount.is_positive() {
                return Err(ValidationError::must_be_positive("discount_amount"));
            }
        }
        CampaignKind::FreeShipping => {}
        CampaignKind::BuyXGetY { buy, get } => {
            if *buy < 1 {
                return Err(ValidationError::out_of_range("buy", 1, i64::from(u32::MAX)));
            }
            if *get < 1 {
                return Err(ValidationError::out_of_range("get", 1, i64::from(u32::MAX)));
            }
        }
    }
    Ok(())
}

/// Validates a full creation request and returns the trimmed name.
pub fn validate_new_campaign(input: &NewCampaign) -> ValidationResult<String> {
    let name = validate_campaign_name(&input.name)?;
    validate_budget(input.budget)?;
    validate_date_range(input.start_date, input.end_date)?;
    validate_kind(&input.kind)?;
    if let Some(coupon) = &input.coupon {
        validate_new_coupon(coupon)?;
    }
    Ok(name)
}

// =============================================================================
// Coupon Validators
// =============================================================================

/// Validates a seller-supplied code and returns its normalized form.
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }
    if code.len() < MIN_CODE_LEN {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: MIN_CODE_LEN,
        });
    }
    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "only letters, digits and hyphens are allowed".to_string(),
        });
    }

    Ok(code)
}

/// Validates the numeric parts of a coupon request.
pub fn validate_new_coupon(input: &NewCoupon) -> ValidationResult<()> {
    if let Some(code) = &input.code {
        validate_coupon_code(code)?;
    }
    if input.max_uses < 0 {
        return Err(ValidationError::out_of_range("max_uses", 0, i64::MAX));
    }
    if input.min_order_amount.is_negative() {
        return Err(ValidationError::out_of_range(
            "min_order_amount",
            0,
            i64::MAX,
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountRate;
    use chrono::Duration;

    fn request() -> NewCampaign {
        let now = Utc::now();
        NewCampaign {
            name: "  Spring Sale  ".to_string(),
            kind: CampaignKind::Percentage {
                rate: DiscountRate::from_percent(20),
            },
            budget: Money::from_cents(50_000),
            start_date: now,
            end_date: now + Duration::days(7),
            coupon: None,
        }
    }

    #[test]
    fn test_validate_campaign_name() {
        assert_eq!(validate_campaign_name(" Spring ").unwrap(), "Spring");
        assert!(matches!(
            validate_campaign_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_campaign_name("A"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(validate_campaign_name(&"a".repeat(100)).is_ok());
        assert!(matches!(
            validate_campaign_name(&"a".repeat(101)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_name_length_counts_characters() {
        // 100 two-byte characters are still 100 characters
        assert!(validate_campaign_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget(Money::from_cents(1)).is_ok());
        assert!(validate_budget(MAX_CAMPAIGN_BUDGET).is_ok());
        assert!(validate_budget(Money::zero()).is_err());
        assert!(validate_budget(Money::from_cents(-5)).is_err());
        assert!(matches!(
            validate_budget(MAX_CAMPAIGN_BUDGET + Money::from_cents(1)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_date_range() {
        let now = Utc::now();
        assert!(validate_date_range(now, now + Duration::seconds(1)).is_ok());
        assert!(matches!(
            validate_date_range(now, now),
            Err(ValidationError::InvalidDateRange)
        ));
    }

    #[test]
    fn test_validate_kind() {
        let pct = |bps| CampaignKind::Percentage {
            rate: DiscountRate::from_bps(bps),
        };
        assert!(validate_kind(&pct(1)).is_ok());
        assert!(validate_kind(&pct(9_000)).is_ok());
        assert!(validate_kind(&pct(0)).is_err());
        assert!(validate_kind(&pct(9_001)).is_err());
        assert!(validate_kind(&CampaignKind::FlashSale {
            rate: DiscountRate::from_percent(91)
        })
        .is_err());

        assert!(validate_kind(&CampaignKind::FixedAmount {
            amount: Money::zero()
        })
        .is_err());
        assert!(validate_kind(&CampaignKind::FreeShipping).is_ok());
        assert!(validate_kind(&CampaignKind::BuyXGetY { buy: 0, get: 1 }).is_err());
        assert!(validate_kind(&CampaignKind::BuyXGetY { buy: 1, get: 0 }).is_err());
        assert!(validate_kind(&CampaignKind::BuyXGetY { buy: 1, get: 1 }).is_ok());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("save-20").unwrap(), "SAVE-20");
        assert!(matches!(
            validate_coupon_code("AB1"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_coupon_code("SAVE 20"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_coupon_code(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_new_campaign() {
        assert_eq!(validate_new_campaign(&request()).unwrap(), "Spring Sale");

        let mut bad = request();
        bad.end_date = bad.start_date - Duration::days(1);
        assert!(matches!(
            validate_new_campaign(&bad),
            Err(ValidationError::InvalidDateRange)
        ));

        let mut bad_coupon = request();
        bad_coupon.coupon = Some(NewCoupon {
            code: None,
            max_uses: -1,
            min_order_amount: Money::zero(),
            expires_at: None,
        });
        assert!(validate_new_campaign(&bad_coupon).is_err());
    }

    #[test]
    fn test_negative_min_order_rejected() {
        let coupon = NewCoupon {
            code: Some("SAVE-20".into()),
            max_uses: 0,
            min_order_amount: Money::from_cents(-1),
            expires_at: None,
        };
        assert!(matches!(
            validate_new_coupon(&coupon),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
