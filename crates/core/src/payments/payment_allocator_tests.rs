#[cfg(test)]
mod tests {
    use crate::loans::{Installment, InstallmentStatus, Loan, LoanStatus};
    use crate::payments::payment_allocator::allocate;
    use crate::payments::PaymentError;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn test_loan(total: Decimal, paid: Decimal) -> Loan {
        let now = Utc::now().naive_utc();
        Loan {
            id: "loan-1".to_string(),
            customer_id: "cust-1".to_string(),
            loan_number: "LN-TEST0001".to_string(),
            principal_amount: total,
            interest_rate: dec!(0),
            term_months: 3,
            amortization_method: "fixed_principal".to_string(),
            late_interest_rate: dec!(0),
            late_fee_amount: dec!(0),
            disbursement_date: d(2024, 1, 1),
            first_payment_date: d(2024, 2, 1),
            maturity_date: d(2024, 4, 1),
            status: LoanStatus::Active.as_str().to_string(),
            total_amount: Some(total),
            total_interest: Some(dec!(0)),
            paid_amount: paid,
            outstanding_balance: Some(total - paid),
            dti_ratio: None,
            version: 1,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn installment(number: i32, total: Decimal, paid: Decimal, status: InstallmentStatus) -> Installment {
        let now = Utc::now().naive_utc();
        Installment {
            id: format!("inst-{}", number),
            loan_id: "loan-1".to_string(),
            installment_number: number,
            due_date: d(2024, 1 + number as u32, 1),
            principal_amount: total,
            interest_amount: dec!(0),
            total_amount: total,
            remaining_balance: dec!(0),
            paid_amount: paid,
            paid_principal: dec!(0),
            paid_interest: dec!(0),
            status: status.as_str().to_string(),
            paid_date: None,
            late_fee: dec!(0),
            late_interest: dec!(0),
            created_at: now,
            updated_at: now,
        }
    }

    fn three_pending_installments() -> Vec<Installment> {
        vec![
            installment(1, dec!(100.00), dec!(0), InstallmentStatus::Pending),
            installment(2, dec!(100.00), dec!(0), InstallmentStatus::Pending),
            installment(3, dec!(100.00), dec!(0), InstallmentStatus::Pending),
        ]
    }

    #[test]
    fn targeted_payment_settles_exactly_one_installment() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        let plan = allocate(&loan, &schedule, dec!(100.00), Some("inst-2"), d(2024, 3, 1))
            .unwrap();

        assert_eq!(plan.installments.len(), 1);
        let settled = &plan.installments[0];
        assert_eq!(settled.id, "inst-2");
        assert_eq!(settled.paid_amount, dec!(100.00));
        assert_eq!(settled.paid_principal, dec!(100.00));
        assert_eq!(settled.status(), InstallmentStatus::Paid);
        assert_eq!(settled.paid_date, Some(d(2024, 3, 1)));
        assert_eq!(plan.principal_paid, Some(dec!(100.00)));
        assert_eq!(plan.interest_paid, Some(dec!(0)));
        assert_eq!(plan.loan_paid_amount, dec!(100.00));
        assert_eq!(plan.loan_outstanding_balance, dec!(200.00));
    }

    #[test]
    fn targeted_payment_mirrors_scheduled_split() {
        let loan = test_loan(dec!(336.00), dec!(0));
        let mut schedule = three_pending_installments();
        schedule[0].principal_amount = dec!(100.00);
        schedule[0].interest_amount = dec!(12.00);
        schedule[0].total_amount = dec!(112.00);

        let plan = allocate(&loan, &schedule, dec!(112.00), Some("inst-1"), d(2024, 2, 1))
            .unwrap();

        let settled = &plan.installments[0];
        assert_eq!(settled.paid_principal, dec!(100.00));
        assert_eq!(settled.paid_interest, dec!(12.00));
        assert_eq!(plan.principal_paid, Some(dec!(100.00)));
        assert_eq!(plan.interest_paid, Some(dec!(12.00)));
    }

    #[test]
    fn targeted_payment_with_wrong_amount_is_rejected() {
        let loan = test_loan(dec!(336.00), dec!(0));
        let mut schedule = three_pending_installments();
        schedule[0].total_amount = dec!(112.00);

        let err = allocate(&loan, &schedule, dec!(100.00), Some("inst-1"), d(2024, 2, 1))
            .unwrap_err();

        match err {
            PaymentError::AmountMismatch { expected } => assert_eq!(expected, dec!(112.00)),
            other => panic!("Expected AmountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn targeted_payment_tolerates_one_cent_difference() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        let plan = allocate(&loan, &schedule, dec!(99.99), Some("inst-1"), d(2024, 2, 1))
            .unwrap();
        assert_eq!(plan.installments[0].status(), InstallmentStatus::Paid);

        let err = allocate(&loan, &schedule, dec!(99.98), Some("inst-1"), d(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, PaymentError::AmountMismatch { .. }));
    }

    #[test]
    fn targeted_payment_on_paid_installment_is_rejected() {
        let loan = test_loan(dec!(300.00), dec!(100.00));
        let mut schedule = three_pending_installments();
        schedule[0] = installment(1, dec!(100.00), dec!(100.00), InstallmentStatus::Paid);

        let err = allocate(&loan, &schedule, dec!(100.00), Some("inst-1"), d(2024, 3, 1))
            .unwrap_err();
        assert!(matches!(err, PaymentError::AlreadySettled(_)));
    }

    #[test]
    fn targeted_payment_on_unknown_installment_is_rejected() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        let err = allocate(&loan, &schedule, dec!(100.00), Some("inst-9"), d(2024, 3, 1))
            .unwrap_err();
        assert!(matches!(err, PaymentError::InstallmentNotFound(_)));
    }

    #[test]
    fn targeted_payment_settles_remainder_of_partial_installment() {
        let loan = test_loan(dec!(300.00), dec!(40.00));
        let mut schedule = three_pending_installments();
        schedule[0] = installment(1, dec!(100.00), dec!(40.00), InstallmentStatus::Partial);

        let plan = allocate(&loan, &schedule, dec!(60.00), Some("inst-1"), d(2024, 3, 1))
            .unwrap();
        assert_eq!(plan.installments[0].paid_amount, dec!(100.00));
        assert_eq!(plan.installments[0].status(), InstallmentStatus::Paid);
    }

    #[test]
    fn waterfall_splits_across_installments_in_order() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        let plan = allocate(&loan, &schedule, dec!(150.00), None, d(2024, 2, 15)).unwrap();

        assert_eq!(plan.installments.len(), 2);
        let first = &plan.installments[0];
        assert_eq!(first.installment_number, 1);
        assert_eq!(first.paid_amount, dec!(100.00));
        assert_eq!(first.status(), InstallmentStatus::Paid);
        assert_eq!(first.paid_date, Some(d(2024, 2, 15)));

        let second = &plan.installments[1];
        assert_eq!(second.installment_number, 2);
        assert_eq!(second.paid_amount, dec!(50.00));
        assert_eq!(second.status(), InstallmentStatus::Partial);
        assert_eq!(second.paid_date, None);

        // Free mode leaves the payment-level split undetermined
        assert_eq!(plan.principal_paid, None);
        assert_eq!(plan.interest_paid, None);

        assert_eq!(plan.loan_paid_amount, dec!(150.00));
        assert_eq!(plan.loan_outstanding_balance, dec!(150.00));
    }

    #[test]
    fn waterfall_tops_up_partial_installment_first() {
        let loan = test_loan(dec!(300.00), dec!(50.00));
        let mut schedule = three_pending_installments();
        schedule[0] = installment(1, dec!(100.00), dec!(50.00), InstallmentStatus::Partial);

        let plan = allocate(&loan, &schedule, dec!(75.00), None, d(2024, 2, 20)).unwrap();

        assert_eq!(plan.installments.len(), 2);
        assert_eq!(plan.installments[0].paid_amount, dec!(100.00));
        assert_eq!(plan.installments[0].status(), InstallmentStatus::Paid);
        assert_eq!(plan.installments[1].paid_amount, dec!(25.00));
        assert_eq!(plan.installments[1].status(), InstallmentStatus::Partial);
    }

    #[test]
    fn waterfall_skips_paid_installments() {
        let loan = test_loan(dec!(300.00), dec!(100.00));
        let mut schedule = three_pending_installments();
        schedule[0] = installment(1, dec!(100.00), dec!(100.00), InstallmentStatus::Paid);

        let plan = allocate(&loan, &schedule, dec!(100.00), None, d(2024, 3, 1)).unwrap();

        assert_eq!(plan.installments.len(), 1);
        assert_eq!(plan.installments[0].installment_number, 2);
        assert_eq!(plan.installments[0].status(), InstallmentStatus::Paid);
    }

    #[test]
    fn waterfall_near_full_payment_counts_as_paid() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        // One cent short of the first installment still settles it
        let plan = allocate(&loan, &schedule, dec!(99.99), None, d(2024, 2, 1)).unwrap();
        assert_eq!(plan.installments.len(), 1);
        assert_eq!(plan.installments[0].paid_amount, dec!(99.99));
        assert_eq!(plan.installments[0].status(), InstallmentStatus::Paid);
    }

    #[test]
    fn overpayment_is_retained_in_the_aggregate_only() {
        let loan = test_loan(dec!(300.00), dec!(0));
        let schedule = three_pending_installments();

        let plan = allocate(&loan, &schedule, dec!(350.00), None, d(2024, 4, 1)).unwrap();

        // Every installment is settled; the extra 50 has no attribution
        assert_eq!(plan.installments.len(), 3);
        let attributed: Decimal = plan.installments.iter().map(|i| i.paid_amount).sum();
        assert_eq!(attributed, dec!(300.00));

        assert_eq!(plan.loan_paid_amount, dec!(350.00));
        assert_eq!(plan.loan_outstanding_balance, dec!(-50.00));
    }

    #[test]
    fn sequence_of_free_payments_summing_to_total_settles_everything() {
        let mut loan = test_loan(dec!(300.00), dec!(0));
        let mut schedule = three_pending_installments();

        for amount in [dec!(80.00), dec!(120.00), dec!(60.00), dec!(40.00)] {
            let plan = allocate(&loan, &schedule, amount, None, d(2024, 3, 1)).unwrap();
            for updated in plan.installments {
                let slot = schedule
                    .iter_mut()
                    .find(|i| i.id == updated.id)
                    .unwrap();
                *slot = updated;
            }
            loan.paid_amount = plan.loan_paid_amount;
            loan.outstanding_balance = Some(plan.loan_outstanding_balance);
        }

        assert!(schedule
            .iter()
            .all(|i| i.status() == InstallmentStatus::Paid));
        assert_eq!(loan.paid_amount, dec!(300.00));
        assert_eq!(loan.outstanding_balance, Some(dec!(0.00)));
    }

    #[test]
    fn allocation_on_loan_without_schedule_is_rejected() {
        let mut loan = test_loan(dec!(300.00), dec!(0));
        loan.total_amount = None;

        let err = allocate(&loan, &[], dec!(100.00), None, d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidData(_)));
    }
}
