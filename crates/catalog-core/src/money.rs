//! # Money Module
//!
//! Provides the `Money` type for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog prices arrive as decimals ("129.99") and are stored as        │
//! │  integer cents (12999). Discount and variant price math is then exact: │
//! │                                                                         │
//! │    price 12999, discount 9999 → saving 3000 (23.08% off)              │
//! │                                                                         │
//! │  No floats anywhere between the seed data and the database.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::from_major_minor(129, 99);
//! let discount = Money::from_cents(9999);
//!
//! assert_eq!((price - discount).cents(), 3000);
//! assert_eq!(price.to_string(), "129.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that differences (savings, variant surcharges below the base
/// price) can be expressed; stored prices are validated non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Addition clamped to the `i64` cent range.
    #[inline]
    pub const fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Percentage saved going from `self` (list price) to `sale`, in basis
    /// points, rounded half up. `None` when the list price is not positive
    /// or the sale price is not lower.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// let list = Money::from_cents(10000);
    /// assert_eq!(list.discount_bps(Money::from_cents(7500)), Some(2500)); // 25%
    /// assert_eq!(list.discount_bps(Money::from_cents(10000)), None);
    /// ```
    pub fn discount_bps(&self, sale: Money) -> Option<u32> {
        if self.0 <= 0 || sale.0 >= self.0 {
            return None;
        }
        let saved = (self.0 - sale.0) as i128;
        let bps = (saved * 10_000 + self.0 as i128 / 2) / self.0 as i128;
        u32::try_from(bps).ok()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`129.99`). Currency symbols are a UI concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(349, 99).cents(), 34999);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(12999).to_string(), "129.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-1000).to_string(), "-10.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(1500);
        assert_eq!((a + b).cents(), 2500);
        assert!((a - b).is_negative());
    }

    #[test]
    fn test_discount_bps() {
        // 129.99 → 99.99 is 23.08% off
        let list = Money::from_cents(12999);
        assert_eq!(list.discount_bps(Money::from_cents(9999)), Some(2308));

        assert_eq!(list.discount_bps(Money::from_cents(13999)), None);
        assert_eq!(Money::zero().discount_bps(Money::zero()), None);
    }

    #[test]
    fn test_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(2499)).unwrap();
        assert_eq!(json, "2499");
    }
}
