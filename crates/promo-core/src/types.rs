//! # Domain Types
//!
//! Core domain types used throughout the promotions system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Campaign     │   │   CouponCode    │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  campaign_id    │   │  id             │       │
//! │  │  seller_id      │   │  code (UPPER)   │   │  seller_id      │       │
//! │  │  kind           │   │  max_uses       │   │  total_amount   │       │
//! │  │  status         │   │  current_uses   │   └─────────────────┘       │
//! │  │  budget / spent │   │  expires_at     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CampaignKind   │   │ CampaignStatus  │   │ DiscountResult  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Percentage     │   │  Draft          │   │  (computed,     │       │
//! │  │  FixedAmount    │   │  Active         │   │   never stored) │       │
//! │  │  FreeShipping   │   │  Paused         │   └─────────────────┘       │
//! │  │  BuyXGetY       │   │  Completed      │                             │
//! │  │  FlashSale      │   │  Cancelled      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted vs Observed Status
//! `CampaignStatus` is what the database stores. "Scheduled" is never stored:
//! it is derived from `Draft` + a future start date by
//! [`crate::lifecycle::observed_status`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::lifecycle::{observed_status, LifecycleState};
use crate::money::{DiscountRate, Money};

// =============================================================================
// Campaign Kind
// =============================================================================

/// Campaign type together with the parameters that type needs.
///
/// Each variant carries only its own parameters, so a fixed amount campaign
/// cannot accidentally be read as a percentage one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampaignKind {
    /// A percentage off the order amount.
    Percentage { rate: DiscountRate },
    /// A flat amount off, never more than the order amount.
    FixedAmount { amount: Money },
    /// Shipping is waived; the monetary total is untouched.
    FreeShipping,
    /// Every `buy + get` units, the `get` cheapest are free.
    BuyXGetY { buy: u32, get: u32 },
    /// Same math as `Percentage`; the time box is the campaign window.
    FlashSale { rate: DiscountRate },
}

impl CampaignKind {
    /// Returns the bare type tag.
    pub const fn campaign_type(&self) -> CampaignType {
        match self {
            CampaignKind::Percentage { .. } => CampaignType::Percentage,
            CampaignKind::FixedAmount { .. } => CampaignType::FixedAmount,
            CampaignKind::FreeShipping => CampaignType::FreeShipping,
            CampaignKind::BuyXGetY { .. } => CampaignType::BuyXGetY,
            CampaignKind::FlashSale { .. } => CampaignType::FlashSale,
        }
    }
}

// =============================================================================
// Campaign Type
// =============================================================================

/// The campaign type without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Percentage,
    FixedAmount,
    FreeShipping,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "buy_x_get_y"))]
    BuyXGetY,
    FlashSale,
}

impl CampaignType {
    /// Returns the stored / serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CampaignType::Percentage => "percentage",
            CampaignType::FixedAmount => "fixed_amount",
            CampaignType::FreeShipping => "free_shipping",
            CampaignType::BuyXGetY => "buy_x_get_y",
            CampaignType::FlashSale => "flash_sale",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Campaign Status
// =============================================================================

/// The persisted status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Not yet running. Observed as "scheduled" while the start is ahead.
    #[default]
    Draft,
    /// Live: coupons validate and discounts apply.
    Active,
    /// Temporarily stopped by the seller.
    Paused,
    /// Ran out of time or budget. Terminal.
    Completed,
    /// Stopped for good by the seller. Terminal.
    Cancelled,
}

impl CampaignStatus {
    /// Returns the stored name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled campaigns never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Cancelled)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Campaign
// =============================================================================

/// A seller-owned, time-boxed promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Campaign {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Seller that owns the campaign.
    pub seller_id: String,

    /// Display name, 2-100 characters.
    pub name: String,

    /// Type and type parameters.
    pub kind: CampaignKind,

    /// Persisted status. Use [`Campaign::observed_status`] for display.
    pub status: CampaignStatus,

    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,

    /// Spend cap.
    pub budget: Money,

    /// Discount handed out so far. Never exceeds `budget`.
    pub spent: Money,

    /// Order value attributed to the campaign.
    pub revenue_generated: Money,

    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Builds a fresh campaign with zeroed counters.
    ///
    /// The initial status is `Active` when the window has already opened,
    /// otherwise `Draft` (observed as scheduled).
    pub fn new(
        seller_id: impl Into<String>,
        name: impl Into<String>,
        kind: CampaignKind,
        budget: Money,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if start_date <= now {
            CampaignStatus::Active
        } else {
            CampaignStatus::Draft
        };

        Campaign {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.into(),
            name: name.into(),
            kind,
            status,
            start_date,
            end_date,
            budget,
            spent: Money::zero(),
            revenue_generated: Money::zero(),
            impressions: 0,
            clicks: 0,
            conversions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the type tag.
    #[inline]
    pub fn campaign_type(&self) -> CampaignType {
        self.kind.campaign_type()
    }

    /// Budget still available, never negative.
    #[inline]
    pub fn remaining_budget(&self) -> Money {
        (self.budget - self.spent).non_negative()
    }

    /// Status as a buyer or seller would see it at `now`.
    #[inline]
    pub fn observed_status(&self, now: DateTime<Utc>) -> LifecycleState {
        observed_status(self.status, self.start_date, now)
    }

    /// Checks whether `now` falls inside `[start_date, end_date]`.
    #[inline]
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

// =============================================================================
// Coupon Code
// =============================================================================

/// A redeemable code bound to one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponCode {
    pub id: String,
    pub campaign_id: String,
    /// Normalized upper-case code.
    pub code: String,
    /// Zero means unlimited.
    pub max_uses: i64,
    pub current_uses: i64,
    pub min_order_amount: Money,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CouponCode {
    /// Checks whether another redemption fits under the usage cap.
    #[inline]
    pub fn has_uses_left(&self) -> bool {
        self.max_uses == 0 || self.current_uses < self.max_uses
    }

    /// Remaining redemptions, or `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<i64> {
        if self.max_uses == 0 {
            None
        } else {
            Some((self.max_uses - self.current_uses).max(0))
        }
    }
}

// =============================================================================
// Orders (external, read-only)
// =============================================================================

/// The slice of an order this crate reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub seller_id: String,
    pub total_amount: Money,
}

/// A line of an order. Only buy-x-get-y campaigns look at these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        OrderItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }
}

// =============================================================================
// Discount Result
// =============================================================================

/// Outcome of running the discount calculator. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountResult {
    pub discount_amount: Money,
    pub discounted_total: Money,
    pub campaign_type: CampaignType,
    pub campaign_name: String,
    pub free_shipping: bool,
    /// Human readable, e.g. "20% off".
    pub description: String,
}

// =============================================================================
// Creation Input
// =============================================================================

/// What a seller submits to create a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCampaign {
    pub name: String,
    pub kind: CampaignKind,
    pub budget: Money,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    /// Optional coupon created in the same call.
    #[serde(default)]
    pub coupon: Option<NewCoupon>,
}

/// Coupon part of a campaign creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCoupon {
    /// Generated when absent.
    #[serde(default)]
    pub code: Option<String>,
    /// Zero means unlimited.
    #[serde(default)]
    pub max_uses: i64,
    #[serde(default)]
    pub min_order_amount: Money,
    /// Defaults to the campaign end date.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Daily Stats
// =============================================================================

/// Per-day spend bucket for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyCampaignStat {
    pub campaign_id: String,
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub spend: Money,
    pub conversions: i64,
    pub revenue: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
