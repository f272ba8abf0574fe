use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use crate::constants::AMOUNT_EPSILON;
use crate::loans::{Installment, InstallmentStatus, Loan};
use crate::utils::money_utils::round_money;

use super::payments_errors::{PaymentError, Result};

/// Result of allocating one payment against a loan's schedule.
///
/// Holds the new state of every touched installment plus the updated loan
/// aggregates. Nothing is mutated in place: a failed allocation returns an
/// error before any plan exists, so persisted state is untouched by
/// construction.
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    /// Touched installments in their post-payment state
    pub installments: Vec<Installment>,
    /// Scheduled principal portion settled by a targeted payment.
    /// `None` in free mode: only installment-level splits are
    /// authoritative there.
    pub principal_paid: Option<Decimal>,
    /// Scheduled interest portion settled by a targeted payment
    pub interest_paid: Option<Decimal>,
    /// New cumulative paid amount for the loan
    pub loan_paid_amount: Decimal,
    /// New outstanding balance; negative under overpayment, never clamped
    pub loan_outstanding_balance: Decimal,
}

/// Applies a payment amount to a loan's schedule.
///
/// With a target installment id the payment must settle that installment
/// in full (within one cent). Without a target the amount waterfalls
/// across unpaid installments in strict chronological order.
///
/// The caller is responsible for serializing allocations per loan and for
/// persisting the plan atomically.
pub fn allocate(
    loan: &Loan,
    schedule: &[Installment],
    amount: Decimal,
    target_installment_id: Option<&str>,
    payment_date: NaiveDate,
) -> Result<AllocationPlan> {
    let total_amount = loan.total_amount.ok_or_else(|| {
        PaymentError::InvalidData(format!("Loan {} has no generated schedule", loan.id))
    })?;

    let (installments, principal_paid, interest_paid) = match target_installment_id {
        Some(target_id) => allocate_targeted(schedule, amount, target_id, payment_date)?,
        None => allocate_waterfall(loan, schedule, amount, payment_date),
    };

    // The aggregate runs on the loan's own counter, not a sum over
    // installments, so overpayment past 100% stays visible.
    let loan_paid_amount = loan.paid_amount + amount;
    let loan_outstanding_balance = total_amount - loan_paid_amount;

    Ok(AllocationPlan {
        installments,
        principal_paid,
        interest_paid,
        loan_paid_amount,
        loan_outstanding_balance,
    })
}

/// Targeted mode: full settlement of one named installment.
fn allocate_targeted(
    schedule: &[Installment],
    amount: Decimal,
    target_id: &str,
    payment_date: NaiveDate,
) -> Result<(Vec<Installment>, Option<Decimal>, Option<Decimal>)> {
    let installment = schedule
        .iter()
        .find(|i| i.id == target_id)
        .ok_or_else(|| PaymentError::InstallmentNotFound(target_id.to_string()))?;

    if installment.status() == InstallmentStatus::Paid {
        return Err(PaymentError::AlreadySettled(
            installment.installment_number.to_string(),
        ));
    }

    let expected = installment.outstanding();
    if (amount - expected).abs() > AMOUNT_EPSILON {
        return Err(PaymentError::AmountMismatch {
            expected: round_money(expected),
        });
    }

    let mut settled = installment.clone();
    settled.paid_amount = settled.total_amount;
    settled.paid_principal = settled.principal_amount;
    settled.paid_interest = settled.interest_amount;
    settled.status = InstallmentStatus::Paid.as_str().to_string();
    settled.paid_date = Some(payment_date);

    let principal_paid = Some(settled.principal_amount);
    let interest_paid = Some(settled.interest_amount);

    Ok((vec![settled], principal_paid, interest_paid))
}

/// Free mode: waterfall over unpaid installments, earliest due first.
fn allocate_waterfall(
    loan: &Loan,
    schedule: &[Installment],
    amount: Decimal,
    payment_date: NaiveDate,
) -> (Vec<Installment>, Option<Decimal>, Option<Decimal>) {
    let mut eligible: Vec<&Installment> = schedule
        .iter()
        .filter(|i| {
            matches!(
                i.status(),
                InstallmentStatus::Pending | InstallmentStatus::Partial
            )
        })
        .collect();
    eligible.sort_by_key(|i| i.installment_number);

    let mut touched = Vec::new();
    let mut remaining_amount = amount;

    for installment in eligible {
        if remaining_amount <= Decimal::ZERO {
            break;
        }

        let outstanding = installment.outstanding();
        let apply = remaining_amount.min(outstanding);
        if apply <= Decimal::ZERO {
            continue;
        }

        let mut updated = installment.clone();
        updated.paid_amount += apply;
        if updated.paid_amount >= updated.total_amount - AMOUNT_EPSILON {
            updated.status = InstallmentStatus::Paid.as_str().to_string();
            updated.paid_date = Some(payment_date);
        } else if updated.paid_amount > Decimal::ZERO {
            updated.status = InstallmentStatus::Partial.as_str().to_string();
        }
        touched.push(updated);

        remaining_amount -= apply;
    }

    if remaining_amount > Decimal::ZERO {
        // Open question for product: the excess lands in the loan
        // aggregate without any installment attribution.
        warn!(
            "Payment of {} on loan {} exceeds total outstanding by {}",
            amount, loan.id, remaining_amount
        );
    }

    (touched, None, None)
}
