//! Rental price arithmetic: rental length, late-return fees and cancellation refunds.
//!
//! Everything here is pure; callers supply the dates and amounts. Arithmetic is
//! checked, so an amount too large to price is a validation error, never a panic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Decimal places a stored amount may carry; money columns are `NUMERIC(12, 2)`.
pub const MONEY_SCALE: u32 = 2;
/// Largest amount a money column holds: 9 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// Late returns up to this many days are charged at half the daily price.
pub const HALF_RATE_MAX_DAYS: i64 = 3;
/// Late returns up to this many days are charged at the full daily price.
pub const FULL_RATE_MAX_DAYS: i64 = 7;
/// Beyond [`FULL_RATE_MAX_DAYS`] the costume is treated as lost and charged at
/// this many days of rent.
pub const REPLACEMENT_DAYS: i64 = 100;

/// Cancelling more than this many days ahead refunds everything.
pub const FULL_REFUND_MIN_DAYS: i64 = 7;
/// Cancelling at least this many days ahead refunds half.
pub const HALF_REFUND_MIN_DAYS: i64 = 3;

/// Number of calendar days a rental covers, counting both endpoints.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Rejects amounts that are negative, finer than cents, or beyond [`MAX_AMOUNT`].
pub fn ensure_money(value: Decimal, field: &str) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

fn mul(a: Decimal, b: Decimal) -> AppResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| AppError::validation("amount is too large to price"))
}

/// Rental length and price for renting at `price_per_day` over `start..=end`.
pub fn quote(price_per_day: Decimal, start: NaiveDate, end: NaiveDate) -> AppResult<(i64, Decimal)> {
    let days = rental_days(start, end);
    Ok((days, mul(price_per_day, Decimal::from(days))?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum FeeRate {
    Percent(u8),
    /// Flat charge for the whole item; serialized as `-1`.
    FullReplacement,
}

impl FeeRate {
    pub fn as_percent(&self) -> i32 {
        match self {
            FeeRate::Percent(p) => i32::from(*p),
            FeeRate::FullReplacement => -1,
        }
    }
}

impl From<FeeRate> for i32 {
    fn from(rate: FeeRate) -> Self {
        rate.as_percent()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LateFee {
    pub fee: Decimal,
    #[schema(value_type = i32)]
    pub rate: FeeRate,
}

pub fn late_fee(days_late: i64, price_per_day: Decimal) -> AppResult<LateFee> {
    let days = Decimal::from(days_late);
    let fee = match days_late {
        d if d <= 0 => LateFee {
            fee: Decimal::ZERO,
            rate: FeeRate::Percent(0),
        },
        d if d <= HALF_RATE_MAX_DAYS => LateFee {
            fee: mul(mul(price_per_day, days)?, Decimal::new(5, 1))?,
            rate: FeeRate::Percent(50),
        },
        d if d <= FULL_RATE_MAX_DAYS => LateFee {
            fee: mul(price_per_day, days)?,
            rate: FeeRate::Percent(100),
        },
        _ => LateFee {
            fee: mul(price_per_day, Decimal::from(REPLACEMENT_DAYS))?,
            rate: FeeRate::FullReplacement,
        },
    };
    Ok(fee)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Refund {
    pub amount: Decimal,
    pub percent: u8,
}

pub fn refund(days_until_start: i64, total_price: Decimal) -> AppResult<Refund> {
    let percent: u8 = if days_until_start > FULL_REFUND_MIN_DAYS {
        100
    } else if days_until_start >= HALF_REFUND_MIN_DAYS {
        50
    } else {
        0
    };
    let amount = mul(total_price, Decimal::from(percent))? / Decimal::ONE_HUNDRED;
    Ok(Refund { amount, percent })
}
