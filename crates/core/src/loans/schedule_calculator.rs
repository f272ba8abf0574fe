use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::constants::AMOUNT_EPSILON;
use crate::utils::money_utils::round_money;
use crate::utils::time_utils::add_months;

/// One row of a freshly generated amortization schedule, before it is
/// persisted as an installment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub total_amount: Decimal,
    pub remaining_balance: Decimal,
}

/// Full output of the schedule calculator: the ordered rows plus the
/// loan-level totals derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchedule {
    pub entries: Vec<ScheduleEntry>,
    pub total_interest: Decimal,
    pub total_amount: Decimal,
    pub maturity_date: NaiveDate,
}

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Builds a fixed-principal amortization schedule.
///
/// Every installment repays the same share of principal; interest is
/// charged on the balance outstanding at the start of the period. The
/// unrounded fixed principal share is carried across iterations so
/// rounding error does not compound; only the reported fields are
/// rounded (2 dp, half-up). Totals are the sum of the per-installment
/// rounded interest figures, keeping them cent-exact against the rows.
///
/// Inputs are assumed validated by the caller: `principal > 0`,
/// `annual_rate_percent >= 0`, `term_months > 0`.
pub fn build_schedule(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: i32,
    first_due_date: NaiveDate,
) -> GeneratedSchedule {
    let monthly_rate = annual_rate_percent / PERCENT / MONTHS_PER_YEAR;
    let fixed_principal = principal / Decimal::from(term_months);

    let mut entries = Vec::with_capacity(term_months as usize);
    let mut remaining = principal;
    let mut total_interest = Decimal::ZERO;

    for i in 1..=term_months {
        let interest = remaining * monthly_rate;
        let total = fixed_principal + interest;
        remaining -= fixed_principal;

        // Terminal rounding floor: never report a dust-sized or negative
        // trailing balance.
        if remaining < AMOUNT_EPSILON {
            remaining = Decimal::ZERO;
        }

        let reported_interest = round_money(interest);
        total_interest += reported_interest;

        entries.push(ScheduleEntry {
            installment_number: i,
            due_date: add_months(first_due_date, (i - 1) as u32),
            principal_amount: round_money(fixed_principal),
            interest_amount: reported_interest,
            total_amount: round_money(total),
            remaining_balance: round_money(remaining),
        });
    }

    GeneratedSchedule {
        entries,
        total_interest,
        total_amount: principal + total_interest,
        maturity_date: add_months(first_due_date, (term_months - 1) as u32),
    }
}

/// Debt-to-income ratio: average monthly obligation over declared
/// monthly income, as a percentage. `None` when income is unknown or
/// not positive.
pub fn debt_to_income_ratio(
    total_amount: Decimal,
    term_months: i32,
    monthly_income: Option<Decimal>,
) -> Option<Decimal> {
    match monthly_income {
        Some(income) if income > Decimal::ZERO => {
            let monthly_obligation = total_amount / Decimal::from(term_months);
            Some(round_money(monthly_obligation / income * PERCENT))
        }
        _ => None,
    }
}
