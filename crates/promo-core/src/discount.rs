//! # Discount Calculator
//!
//! Pure function from (campaign, order amount, order items) to a
//! [`DiscountResult`]. No side effects, no clock, no I/O.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  campaign.kind ──► raw discount (per type)                              │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                 min(raw, budget - spent)      ← budget cap first        │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                 min(capped, order_amount)     ← then order cap          │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  DiscountResult { discount_amount, discounted_total, description, .. }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Buy X Get Y
//! Units are expanded one entry per item unit and sorted by unit price,
//! cheapest first. For every complete group of `buy + get` units, `get` units
//! are free, and the free ones are the cheapest in the whole order. Leftover
//! units that do not complete a group earn nothing.

use crate::money::Money;
use crate::types::{Campaign, CampaignKind, DiscountResult, OrderItem};

/// Computes the discount a campaign grants on an order.
///
/// The result is always within `[0, min(order_amount, remaining budget)]`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use promo_core::discount::calculate_discount;
/// use promo_core::types::{Campaign, CampaignKind, OrderItem};
/// use promo_core::Money;
///
/// let now = Utc::now();
/// let campaign = Campaign::new(
///     "seller-1",
///     "Three for two",
///     CampaignKind::BuyXGetY { buy: 2, get: 1 },
///     Money::from_cents(100_000),
///     now,
///     now + Duration::days(1),
///     now,
/// );
/// let items = [
///     OrderItem::new("a", 1, Money::from_cents(1000)),
///     OrderItem::new("b", 1, Money::from_cents(2000)),
///     OrderItem::new("c", 1, Money::from_cents(3000)),
/// ];
///
/// let result = calculate_discount(&campaign, Money::from_cents(6000), &items);
/// assert_eq!(result.discount_amount.cents(), 1000);
/// assert_eq!(result.discounted_total.cents(), 5000);
/// ```
pub fn calculate_discount(
    campaign: &Campaign,
    order_amount: Money,
    items: &[OrderItem],
) -> DiscountResult {
    let order_amount = order_amount.non_negative();

    let raw = match campaign.kind {
        CampaignKind::Percentage { rate } | CampaignKind::FlashSale { rate } => {
            order_amount.percentage(rate)
        }
        CampaignKind::FixedAmount { amount } => amount.min(order_amount),
        CampaignKind::FreeShipping => Money::zero(),
        CampaignKind::BuyXGetY { buy, get } => buy_x_get_y_discount(items, buy, get),
    };

    let discount_amount = raw
        .min(campaign.remaining_budget())
        .min(order_amount)
        .non_negative();

    DiscountResult {
        discount_amount,
        discounted_total: order_amount - discount_amount,
        campaign_type: campaign.campaign_type(),
        campaign_name: campaign.name.clone(),
        free_shipping: matches!(campaign.kind, CampaignKind::FreeShipping),
        description: describe(&campaign.kind),
    }
}

/// Human readable summary of what a campaign grants.
pub fn describe(kind: &CampaignKind) -> String {
    match kind {
        CampaignKind::Percentage { rate } => format!("{} off", rate),
        CampaignKind::FixedAmount { amount } => format!("{} off", amount),
        CampaignKind::FreeShipping => "Free shipping".to_string(),
        CampaignKind::BuyXGetY { buy, get } => format!("Buy {} get {} free", buy, get),
        CampaignKind::FlashSale { rate } => format!("Flash sale: {} off", rate),
    }
}

/// Number of free units for `total_quantity` units.
///
/// `floor(total / (buy + get)) * get`; zero when `buy + get` is zero.
pub fn free_unit_count(total_quantity: i64, buy: u32, get: u32) -> i64 {
    let group = i64::from(buy) + i64::from(get);
    if group == 0 || total_quantity < group {
        return 0;
    }
    (total_quantity / group) * i64::from(get)
}

fn buy_x_get_y_discount(items: &[OrderItem], buy: u32, get: u32) -> Money {
    let mut lines: Vec<&OrderItem> = items.iter().filter(|item| item.quantity > 0).collect();
    let total_quantity = lines
        .iter()
        .fold(0i64, |total, item| total.saturating_add(item.quantity));

    let mut free_left = free_unit_count(total_quantity, buy, get);
    if free_left == 0 {
        return Money::zero();
    }

    // Cheapest units are the free ones
    lines.sort_by_key(|item| item.unit_price);

    let mut discount_cents = 0i64;
    for item in lines {
        if free_left == 0 {
            break;
        }
        let units = item.quantity.min(free_left);
        let line_cents = item.unit_price.cents().saturating_mul(units);
        discount_cents = discount_cents.saturating_add(line_cents);
        free_left -= units;
    }

    Money::from_cents(discount_cents)
}

// =============================================================================
// Unit Tests
// =============================================================================
