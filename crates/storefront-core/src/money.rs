//! # Money Module
//!
//! Provides the `Money` and `Points` types for handling monetary values and
//! loyalty currency safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    ceil() of a value a hair above an integer charges one extra point    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    ceil(100000 minor × 3700 bps / 1 000 000) = 370 points               │
//! │    Exact every time. Ceiling stays a ceiling.                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The backend speaks decimal currency amounts (`"normalPrice": 1099.5`).
//! `Money` converts to and from that representation at the serde boundary
//! only, rounding to the nearest minor unit. Inside the crate every value is
//! an `i64` of minor units.
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::{Money, Points};
//!
//! let price = Money::from_minor(100_000); // ₹1000.00
//! let points = Points::new(370);
//!
//! // 1 point = 1 currency unit
//! assert_eq!(points.value(), Money::from_major(370));
//! assert_eq!((price - points.value()).minor(), 63_000);
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Minor units per major currency unit (paise per rupee).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts in summaries
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Custom serde**: decimal major units on the wire, minor units inside
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.normal_price ──► effective_price ──► RedemptionQuote.cash      │
/// │                                                    │                    │
/// │                                                    ▼                    │
/// │  CartSummary.mrp_total ─► platform fee ─► CartSummary.total_payable     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // ₹10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Creates a Money value from whole currency units, or `None` when the
    /// result does not fit in minor units.
    #[inline]
    pub const fn checked_from_major(major: i64) -> Option<Self> {
        match major.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    /// Converts a decimal wire amount to minor units.
    ///
    /// Only used at the deserialization boundary. Rounds to the nearest
    /// minor unit so `19.99` lands on `1999`, not `1998`. Returns `None`
    /// for non-finite amounts and amounts outside the `i64` range.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        let minor = (amount * MINOR_PER_MAJOR as f64).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        if !minor.is_finite() || minor < i64::MIN as f64 || minor >= i64::MAX as f64 {
            return None;
        }
        Some(Money(minor as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole currency unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Decimal representation for the wire.
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
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
    #[inline]
    pub const fn non_negative(&self) -> Self {
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
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(29_900);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 89_700);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// The discount amount is rounded half-up to a minor unit before it is
    /// subtracted.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::{DiscountRate, Money};
    ///
    /// let price = Money::from_major(500);
    /// let discounted = price.apply_discount(DiscountRate::from_bps(1000)); // 10% off
    /// assert_eq!(discounted, Money::from_major(450));
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        let discount_amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(self.0 - discount_amount as i64)
    }

    /// Formats with an explicit currency symbol (`₹1000.00`).
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. The CLI formats with the configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("₹"))
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal currency amount")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                if !v.is_finite() {
                    return Err(E::custom("amount must be finite"));
                }
                Money::from_decimal(v).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Money::checked_from_major(v).ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(Money::checked_from_major)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            // Some backends serialize BigDecimal as a string.
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| E::custom(format!("invalid amount '{}'", v)))
                    .and_then(|f| self.visit_f64(f))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

// =============================================================================
// Points
// =============================================================================

/// Whole e-points. One point is worth exactly one currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(i64);

impl Points {
    #[inline]
    pub const fn new(points: i64) -> Self {
        Points(points)
    }

    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Cash equivalent of these points.
    #[inline]
    pub const fn value(&self) -> Money {
        Money::from_major(self.0)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} EP", self.0)
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Points(self.0 + other.0)
    }
}

impl Mul<i64> for Points {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Points(self.0 * qty)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::zero(), Add::add)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 3700 bps = 37%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage as the backend sends it.
    ///
    /// Negative and non-finite inputs collapse to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return DiscountRate(0);
        }
        DiscountRate((pct * 100.0).round().min(10000.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_and_parts() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_minor(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().format_with("$"), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_minor(-1).non_negative(), Money::zero());
        assert_eq!(Money::from_minor(7).non_negative().minor(), 7);
    }

    #[test]
    fn test_apply_discount() {
        let price = Money::from_major(500);
        assert_eq!(price.apply_discount(DiscountRate::from_bps(1000)), Money::from_major(450));
        assert_eq!(price.apply_discount(DiscountRate::zero()), price);
    }

    #[test]
    fn test_deserialize_from_decimal_wire_values() {
        let m: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(m.minor(), 1999);

        let m: Money = serde_json::from_str("1000").unwrap();
        assert_eq!(m.minor(), 100_000);

        let m: Money = serde_json::from_str("\"450.50\"").unwrap();
        assert_eq!(m.minor(), 45_050);

        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_amounts() {
        // Fits in i64 as whole rupees but not as paise.
        let err = serde_json::from_str::<Money>("100000000000000000").unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert!(serde_json::from_str::<Money>("-100000000000000000").is_err());
        assert!(serde_json::from_str::<Money>("18446744073709551615").is_err());
        assert!(serde_json::from_str::<Money>("1e300").is_err());
        assert!(serde_json::from_str::<Money>("\"1e19\"").is_err());

        let m: Money = serde_json::from_str("92233720368547758").unwrap();
        assert_eq!(m.minor(), 9_223_372_036_854_775_800);
    }

    #[test]
    fn test_from_decimal_bounds() {
        assert_eq!(Money::from_decimal(19.99), Some(Money::from_minor(1999)));
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
        assert_eq!(Money::from_decimal(1e17), None);
        assert_eq!(Money::checked_from_major(i64::MAX), None);
    }

    #[test]
    fn test_serialize_as_decimal() {
        let json = serde_json::to_string(&Money::from_minor(45_050)).unwrap();
        assert_eq!(json, "450.5");
    }

    #[test]
    fn test_points_value() {
        assert_eq!(Points::new(370).value(), Money::from_major(370));
        assert_eq!(Points::new(3).to_string(), "3 EP");
        let sum: Points = vec![Points::new(1), Points::new(2)].into_iter().sum();
        assert_eq!(sum, Points::new(3));
    }

    #[test]
    fn test_discount_rate_from_percentage() {
        assert_eq!(DiscountRate::from_percentage(10.0).bps(), 1000);
        assert_eq!(DiscountRate::from_percentage(12.5).bps(), 1250);
        assert!(DiscountRate::from_percentage(-3.0).is_zero());
        assert!(DiscountRate::from_percentage(f64::NAN).is_zero());
        assert_eq!(DiscountRate::from_percentage(150.0).bps(), 10000);
    }
}
