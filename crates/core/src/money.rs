//! Currency amounts.
//!
//! Amounts are held as an integer count of minor units (cents) so totals are exact.
//! On the wire (catalog source, persisted cart, analytics payloads) they appear as a
//! decimal number of major units, e.g. `89.99`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Non-negative amount of money in minor units (e.g. cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Parse a major-unit amount (e.g. `89.99`), rounding to the nearest cent.
    ///
    /// Returns `None` for negative, NaN or infinite inputs.
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return None;
        }
        Some(Self(cents as u64))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Amount in major units, for analytics payloads and display.
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self × quantity`, saturating at `u64::MAX` cents.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// A share of this amount expressed in basis points (1000 bps = 10%),
    /// rounded half-up to the nearest cent.
    pub fn basis_points(self, bps: u32) -> Self {
        let scaled = u128::from(self.0) * u128::from(bps) + 5_000;
        Self((scaled / 10_000) as u64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal amount")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                let v = u64::try_from(v).map_err(|_| E::custom("amount must be non-negative"))?;
                self.visit_u64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_major(v).ok_or_else(|| E::custom("amount must be a non-negative number"))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}
