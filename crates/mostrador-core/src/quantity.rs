//! # Quantity Module
//!
//! Provides the `Quantity` type for stock amounts.
//!
//! Stock is unit-dependent: cigarettes sell in whole units, rice in
//! fractional kilos, kerosene in fractional litres. Storing quantities as
//! floats invites the same drift that floats cause for money, so quantities
//! are integer thousandths of the product's base unit ("millis"):
//!
//! ```text
//!   2 units    → 2000 millis
//!   0.5 kg     →  500 millis
//!   1.250 L    → 1250 millis
//! ```
//!
//! Three decimal places cover the scale granularity sold over the counter.
//! Signed values represent ledger deltas: positive adds stock, negative
//! removes it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A stock quantity in thousandths of a base unit.
///
/// Mirrors [`Money`](crate::money::Money): a signed i64 newtype with exact
/// integer arithmetic. Used both for on-hand stock and for signed movement
/// deltas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Thousandths per base unit.
    pub const SCALE: i64 = 1000;

    /// Zero quantity.
    pub const ZERO: Quantity = Quantity(0);

    /// Creates a quantity from whole base units.
    ///
    /// ```rust
    /// use mostrador_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::from_units(3).millis(), 3000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    /// Creates a quantity from thousandths of a base unit.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Quantity(millis)
    }

    /// Returns the value in thousandths of a base unit.
    #[inline]
    pub const fn millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative quantities to zero.
    ///
    /// Used for the stock floor: applying a movement never drives on-hand
    /// stock below zero, however large the requested decrement.
    #[inline]
    pub const fn floor_zero(self) -> Quantity {
        if self.0 < 0 {
            Quantity::ZERO
        } else {
            self
        }
    }

    /// Multiplies a line quantity by a variant size.
    ///
    /// A sale line of `quantity` variants, each representing `size` base
    /// units, moves `quantity × size` base units of stock. Both operands
    /// are in millis, so the product is rescaled through an i128
    /// intermediate.
    ///
    /// ```rust
    /// use mostrador_core::quantity::Quantity;
    ///
    /// // 2 variants of the 5-litre tier → 10 litres
    /// let qty = Quantity::from_units(2);
    /// let size = Quantity::from_units(5);
    /// assert_eq!(qty.scale(size), Quantity::from_units(10));
    /// ```
    pub fn scale(self, size: Quantity) -> Quantity {
        let product = self.0 as i128 * size.0 as i128;
        Quantity((product / Self::SCALE as i128) as i64)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    #[inline]
    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    #[inline]
    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, rhs: Quantity) {
        self.0 -= rhs.0;
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    #[inline]
    fn neg(self) -> Quantity {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl fmt::Display for Quantity {
    /// Formats as units with three decimals, e.g. `2.000` or `-0.500`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:03}", sign, abs / Self::SCALE, abs % Self::SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        assert_eq!(Quantity::from_units(3).millis(), 3000);
        assert_eq!(Quantity::from_units(-2).millis(), -2000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Quantity::from_units(5);
        let b = Quantity::from_millis(1500);
        assert_eq!((a + b).millis(), 6500);
        assert_eq!((a - b).millis(), 3500);
        assert_eq!((-b).millis(), -1500);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Quantity::from_millis(-1).floor_zero(), Quantity::ZERO);
        assert_eq!(Quantity::from_units(5).floor_zero(), Quantity::from_units(5));
        assert_eq!(Quantity::ZERO.floor_zero(), Quantity::ZERO);
    }

    #[test]
    fn test_scale_whole() {
        let qty = Quantity::from_units(3);
        let size = Quantity::from_units(1);
        assert_eq!(qty.scale(size), Quantity::from_units(3));
    }

    #[test]
    fn test_scale_variant() {
        // 2 variants × 5 units each = 10 units
        assert_eq!(
            Quantity::from_units(2).scale(Quantity::from_units(5)),
            Quantity::from_units(10)
        );
        // 0.5 kg × 1 unit tier = 0.5 kg
        assert_eq!(
            Quantity::from_millis(500).scale(Quantity::from_units(1)),
            Quantity::from_millis(500)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_units(2).to_string(), "2.000");
        assert_eq!(Quantity::from_millis(-500).to_string(), "-0.500");
    }
}
