//! # Money Module
//!
//! Provides the `Money` and `DiscountRate` types for handling monetary values
//! and percentages safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A campaign that grants 20% off a thousand orders must spend exactly   │
//! │  what the coupons handed out, to the cent, or `spent <= budget`        │
//! │  stops meaning anything.                                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                            │
//! │    5000 cents × 2000 bps = 1000 cents, rounded half up                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use promo_core::money::{DiscountRate, Money};
//!
//! let order = Money::from_cents(5_000); // $50.00
//! let discount = order.percentage(DiscountRate::from_percent(20));
//! assert_eq!(discount.cents(), 1_000); // $10.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Campaign.budget ──┬──► remaining budget ──► discount cap               │
/// │                    │                                                    │
/// │  Campaign.spent ───┘                                                    │
/// │                                                                         │
/// │  Order amount ──► calculate_discount() ──► DiscountResult.discount     │
/// │                                                 │                       │
/// │                                                 ▼                       │
/// │                              redemption: spent += discount              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// let overspent = Money::from_cents(100) - Money::from_cents(150);
    /// assert_eq!(overspent.non_negative(), Money::zero());
    /// ```
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns `rate` of this amount, rounded half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5). Only meaningful for
    /// non-negative amounts, which is all a discount is ever taken from.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::{DiscountRate, Money};
    ///
    /// // $0.05 at 10% = 0.5 cents → rounds up to 1 cent
    /// let tiny = Money::from_cents(5).percentage(DiscountRate::from_percent(10));
    /// assert_eq!(tiny.cents(), 1);
    /// ```
    pub fn percentage(&self, rate: DiscountRate) -> Money {
        // i128 so large order totals cannot overflow the intermediate product
        let cents = (self.0 as i128 * rate.bps() as i128 + 5_000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Divides the amount by `divisor`, rounded half up to the cent.
    ///
    /// Returns zero when `divisor` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// // $10.00 over 3 conversions = $3.33
    /// assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
    /// // $0.05 over 2 = 2.5 cents → 3 cents
    /// assert_eq!(Money::from_cents(5).per_unit(2).cents(), 3);
    /// ```
    pub fn per_unit(&self, divisor: i64) -> Money {
        if divisor == 0 {
            return Money::zero();
        }
        let numerator = self.0 as i128 * 2 + divisor as i128;
        Money::from_cents((numerator / (divisor as i128 * 2)) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$10.99`. Used in coupon messages and descriptions.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 12.5% off is exactly 1250 bps and
/// never a float. Campaigns accept up to 9000 bps (90%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Shows the rate as `20%`, `12.5%` or `12.25%`.
impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        if fraction == 0 {
            write!(f, "{}%", whole)
        } else if fraction % 10 == 0 {
            write!(f, "{}.{}%", whole, fraction / 10)
        } else {
            write!(f, "{}.{:02}%", whole, fraction)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
