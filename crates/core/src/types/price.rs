//! Display prices for cart entries.
//!
//! Books in the catalog carry no price. The cart assigns each entry a list
//! price once, when it is added, and keeps it for the life of the entry.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Lowest generated list price, in cents.
const MIN_LIST_PRICE_CENTS: i64 = 999;
/// Highest generated list price, in cents.
const MAX_LIST_PRICE_CENTS: i64 = 2999;

/// A USD amount.
///
/// Serializes as a decimal string (`"19.99"`) and also accepts a JSON number
/// when reading, so carts written by older clients still load.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a cart entry may carry: $1,000,000.00.
    pub const MAX_ENTRY: Self = Self(Decimal::from_parts(100_000_000, 0, 0, false, 2));

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build a price from whole cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Draw a list price uniformly from $9.99 to $29.99 inclusive, to the cent.
    pub fn random_list_price<R: Rng>(rng: &mut R) -> Self {
        Self::from_cents(rng.random_range(MIN_LIST_PRICE_CENTS..=MAX_LIST_PRICE_CENTS))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the amount lies in `0..=MAX_ENTRY`.
    #[must_use]
    pub fn is_valid_entry_price(&self) -> bool {
        !self.is_negative() && *self <= Self::MAX_ENTRY
    }

    /// Round to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Price {
    /// Formats as `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        write!(f, "${rounded:.2}")
    }
}
