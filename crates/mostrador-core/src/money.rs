//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cash register that drifts a cent per sale is a register that never   │
//! │  reconciles.                                                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                          │
//! │    We KNOW we lost 1 cent, and handle it explicitly                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::quantity::Quantity;

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for shortfalls and variances
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// Every monetary value in the ledger flows through this type: sale totals,
/// cash movement amounts, register balances and close-time variances.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major units (e.g. whole dollars).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the amount is strictly negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity in thousandths of a unit.
    ///
    /// Uses an i128 intermediate so `price × quantity` cannot overflow,
    /// then divides by the quantity scale. Truncates toward zero; a line of
    /// 0.333 kg at $1.00/kg totals 33 cents and the lost fraction stays in
    /// the drawer, not in the books.
    ///
    /// ```rust
    /// use mostrador_core::money::Money;
    /// use mostrador_core::quantity::Quantity;
    ///
    /// let unit_price = Money::from_cents(1000); // $10.00 per unit
    /// let line = unit_price.scaled_by(Quantity::from_units(2));
    /// assert_eq!(line.cents(), 2000);
    ///
    /// let half = unit_price.scaled_by(Quantity::from_millis(500)); // 0.5 units
    /// assert_eq!(half.cents(), 500);
    /// ```
    pub fn scaled_by(self, quantity: Quantity) -> Money {
        let product = self.0 as i128 * quantity.millis() as i128;
        Money((product / Quantity::SCALE as i128) as i64)
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    /// Formats as major.minor, e.g. `10.99` or `-0.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}
