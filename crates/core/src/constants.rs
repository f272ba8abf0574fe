use rust_decimal::{Decimal, RoundingStrategy};

/// Scale used for every reported monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounding mode for monetary amounts. Half-up: 0.125 -> 0.13.
pub const MONEY_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Tolerance below which two monetary amounts are treated as equal.
/// Also the floor for the trailing remaining-balance clamp in the
/// schedule calculator.
pub const AMOUNT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
