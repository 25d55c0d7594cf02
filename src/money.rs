//! Conversions between domain amounts and stored minor units.
//!
//! The database keeps every amount as an `i64` count of cents; the rest of the
//! crate works with [`Decimal`]. Amounts finer than a cent are rejected rather
//! than rounded.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Number of fractional digits kept for stored amounts.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Converts stored cents back into a decimal amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MINOR_UNIT_SCALE)
}

/// Converts a decimal amount into cents.
///
/// Fails with [`Error::InvalidAmount`] when the value has more than two
/// fractional digits or does not fit in an `i64`.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if amount.normalize().scale() > MINOR_UNIT_SCALE {
        return Err(Error::InvalidAmount { amount });
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or(Error::InvalidAmount { amount })
}

/// Validates an expense amount (strictly positive) and converts it to cents.
pub fn positive_cents(amount: Decimal) -> Result<i64> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    to_cents(amount)
}

/// Validates a planned amount (zero allowed) and converts it to cents.
pub fn non_negative_cents(amount: Decimal) -> Result<i64> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    to_cents(amount)
}
