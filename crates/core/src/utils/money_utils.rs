use rust_decimal::Decimal;

use crate::constants::{AMOUNT_EPSILON, MONEY_ROUNDING, MONEY_SCALE};

/// Rounds a monetary amount to the reporting scale (2 dp, half-up).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, MONEY_ROUNDING)
}

/// Two amounts are considered settled-equal when they differ by at most
/// one cent.
pub fn amounts_match(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= AMOUNT_EPSILON
}
