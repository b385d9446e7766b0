//! # Money Module
//!
//! The `Money` type and the `Adjustment` type used for discounts,
//! additions, and payment-method fees.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                     │
//! │                                                                 │
//! │  In floating point:  0.1 + 0.2 = 0.30000000000000004            │
//! │                                                                 │
//! │  A register that drifts by a fraction of a cent per line item   │
//! │  will not reconcile at close. Our solution: integer cents.      │
//! │  1000 cents / 3 = 333 cents - the lost cent is explicit and     │
//! │  visible, never hidden in a mantissa.                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All monetary values in the system flow through `Money`: product prices,
//! line totals, tender amounts, fees, register floats, and variances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are legal - a register variance or a
///   refund is negative money
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Serde transparent over cents**: the wire format is an integer, so no
///   serializer can introduce float drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    ///
    /// Used by the pricing engine: a cart-level discount larger than the
    /// subtotal yields a total of zero, never a negative sale.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // R$ 2,99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes a percentage of this value, given in basis points.
    ///
    /// 1 basis point = 0.01%, so 1000 bps = 10%. Uses half-up integer
    /// rounding in i128 to avoid both float drift and overflow:
    /// `(cents * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(20000); // R$ 200,00
    /// assert_eq!(subtotal.percent_bps(1000).cents(), 2000); // 10%
    /// assert_eq!(subtotal.percent_bps(300).cents(), 600);   // 3%
    /// ```
    pub fn percent_bps(&self, bps: u32) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Adjustment
// =============================================================================

/// A price adjustment: either a percentage of some base or a fixed amount.
///
/// One closed variant covers every place the domain adjusts a price:
/// per-item discounts, cart-level discount and addition, and
/// payment-method fees. The base the percentage applies to is decided by
/// the caller (line total, subtotal, or tender amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Adjustment {
    /// Percentage in basis points (1000 = 10%).
    Percent(u32),
    /// Fixed amount in cents.
    Fixed(i64),
}

impl Adjustment {
    /// No adjustment at all.
    #[inline]
    pub const fn none() -> Self {
        Adjustment::Fixed(0)
    }

    /// Computes the adjustment amount against a base value.
    ///
    /// A `Percent` adjustment is derived from `base`; a `Fixed` adjustment
    /// ignores it.
    pub fn amount_on(&self, base: Money) -> Money {
        match self {
            Adjustment::Percent(bps) => base.percent_bps(*bps),
            Adjustment::Fixed(cents) => Money::from_cents(*cents),
        }
    }

    /// Checks that the adjustment's raw value is non-negative.
    ///
    /// Negative discounts/fees are a validation error upstream, never
    /// silently absorbed.
    pub const fn is_non_negative(&self) -> bool {
        match self {
            Adjustment::Percent(_) => true,
            Adjustment::Fixed(cents) => *cents >= 0,
        }
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::none()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display in a human-readable format. Debug/log use only; UI formatting
/// and localization happen client-side.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "R$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "R$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "R$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_sum_iterator() {
        let total: Money = [100, 250, 49].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 399);
    }

    #[test]
    fn test_percent_bps_half_up_rounding() {
        // R$ 10,00 at 8.25% = 82.5 cents, rounds half-up to 83
        assert_eq!(Money::from_cents(1000).percent_bps(825).cents(), 83);
        // R$ 100,00 at 10% = exact 1000 cents
        assert_eq!(Money::from_cents(10000).percent_bps(1000).cents(), 1000);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-100).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(100).clamp_non_negative().cents(), 100);
    }

    #[test]
    fn test_adjustment_percent() {
        let subtotal = Money::from_cents(18000);
        let discount = Adjustment::Percent(500); // 5%
        assert_eq!(discount.amount_on(subtotal).cents(), 900);
    }

    #[test]
    fn test_adjustment_fixed_ignores_base() {
        let fixed = Adjustment::Fixed(900);
        assert_eq!(fixed.amount_on(Money::from_cents(1)).cents(), 900);
        assert_eq!(fixed.amount_on(Money::from_cents(999999)).cents(), 900);
    }

    #[test]
    fn test_adjustment_non_negative() {
        assert!(Adjustment::Percent(1000).is_non_negative());
        assert!(Adjustment::Fixed(0).is_non_negative());
        assert!(!Adjustment::Fixed(-1).is_non_negative());
    }

    /// Documents the intentional precision behavior: splitting R$ 10,00
    /// three ways loses one visible cent, it is never hidden.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let third = Money::from_cents(1000 / 3);
        let reconstructed = third * 3;
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
