// core/src/model/money.rs

use crate::error::{BrokerError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// The only currency this service charges in.
pub const CURRENCY: &str = "inr";

/// Converts a major-unit amount (rupees) to minor units (paise).
///
/// Sub-paisa fractions round half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
  amount
    .checked_mul(Decimal::ONE_HUNDRED)
    .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    .and_then(|minor| minor.to_i64())
    .ok_or_else(|| BrokerError::InvalidAmount(format!("{} does not fit in minor units", amount)))
}

pub fn from_minor_units(minor: i64) -> Decimal {
  Decimal::new(minor, 2).normalize()
}
