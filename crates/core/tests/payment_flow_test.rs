use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use loanbook_core::customers::{CustomerService, CustomerServiceTrait, NewCustomer};
use loanbook_core::db::{self, DbPool};
use loanbook_core::errors::Error;
use loanbook_core::loans::{
    InstallmentStatus, LoanService, LoanServiceTrait, LoanStatus, NewLoan,
};
use loanbook_core::payments::{
    NewPayment, PaymentError, PaymentService, PaymentServiceTrait, PaymentStatus,
};

fn setup_pool() -> (Arc<DbPool>, TempDir) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(tmp.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (pool, tmp)
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_customer() -> NewCustomer {
    NewCustomer {
        dni: "12345678".to_string(),
        full_name: "Maria Quispe".to_string(),
        phone: None,
        email: Some("maria@example.com".to_string()),
        address: None,
        monthly_income: Some(dec!(1000.00)),
        employment_status: Some("employed".to_string()),
        employer_name: None,
        credit_score: Some(720),
    }
}

fn sample_loan(customer_id: &str) -> NewLoan {
    NewLoan {
        customer_id: customer_id.to_string(),
        principal_amount: dec!(1200.00),
        interest_rate: dec!(12),
        term_months: 12,
        amortization_method: "fixed_principal".to_string(),
        late_interest_rate: dec!(0),
        late_fee_amount: dec!(0),
        disbursement_date: d(2023, 12, 15),
        first_payment_date: d(2024, 1, 1),
        notes: None,
    }
}

#[tokio::test]
async fn loan_creation_generates_schedule_and_totals() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();

    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    assert_eq!(created.loan.status(), LoanStatus::Active);
    assert_eq!(created.loan.total_interest, Some(dec!(78.00)));
    assert_eq!(created.loan.total_amount, Some(dec!(1278.00)));
    assert_eq!(created.loan.outstanding_balance, Some(dec!(1278.00)));
    assert_eq!(created.loan.paid_amount, dec!(0));
    assert_eq!(created.loan.maturity_date, d(2024, 12, 1));
    assert_eq!(created.loan.dti_ratio, Some(dec!(10.65)));
    assert!(created.loan.loan_number.starts_with("LN-"));
    assert_eq!(created.payment_schedule.len(), 12);

    // Reload through the query path to confirm persisted values round-trip
    let reloaded = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    assert_eq!(reloaded.payment_schedule.len(), 12);
    let first = &reloaded.payment_schedule[0];
    assert_eq!(first.total_amount, dec!(112.00));
    assert_eq!(first.remaining_balance, dec!(1100.00));
    assert_eq!(first.status(), InstallmentStatus::Pending);
    let last = &reloaded.payment_schedule[11];
    assert_eq!(last.total_amount, dec!(101.00));
    assert_eq!(last.remaining_balance, dec!(0.00));
}

#[tokio::test]
async fn unsupported_amortization_method_is_rejected() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();

    let mut new_loan = sample_loan(&customer.id);
    new_loan.amortization_method = "french".to_string();

    let err = loan_service.create_loan(new_loan, None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Loan(loanbook_core::loans::LoanError::UnsupportedAmortizationMethod(_))
    ));
}

#[tokio::test]
async fn targeted_payment_settles_installment_and_updates_aggregates() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();
    let first_installment = created.payment_schedule[0].clone();

    // Wrong amount is rejected before anything is touched
    let err = payment_service
        .record_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: Some(first_installment.id.clone()),
                amount: dec!(100.00),
                payment_date: d(2024, 1, 2),
                payment_method: Some("cash".to_string()),
                reference_number: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Payment(PaymentError::AmountMismatch { .. })
    ));

    let untouched = loan_service.get_loan(&created.loan.id).unwrap();
    assert_eq!(untouched.paid_amount, dec!(0));
    assert_eq!(untouched.version, 1);

    // Exact amount settles the installment
    let payment = payment_service
        .record_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: Some(first_installment.id.clone()),
                amount: dec!(112.00),
                payment_date: d(2024, 1, 2),
                payment_method: Some("cash".to_string()),
                reference_number: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(payment.status(), PaymentStatus::Approved);
    assert_eq!(payment.principal_paid, Some(dec!(100.00)));
    assert_eq!(payment.interest_paid, Some(dec!(12.00)));

    let reloaded = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    let settled = &reloaded.payment_schedule[0];
    assert_eq!(settled.status(), InstallmentStatus::Paid);
    assert_eq!(settled.paid_amount, dec!(112.00));
    assert_eq!(settled.paid_principal, dec!(100.00));
    assert_eq!(settled.paid_interest, dec!(12.00));
    assert_eq!(settled.paid_date, Some(d(2024, 1, 2)));

    // The other eleven installments are untouched
    assert!(reloaded.payment_schedule[1..]
        .iter()
        .all(|i| i.status() == InstallmentStatus::Pending));

    assert_eq!(reloaded.loan.paid_amount, dec!(112.00));
    assert_eq!(reloaded.loan.outstanding_balance, Some(dec!(1166.00)));
    assert_eq!(reloaded.loan.version, 2);

    // Paying the same installment again is rejected
    let err = payment_service
        .record_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: Some(first_installment.id),
                amount: dec!(112.00),
                payment_date: d(2024, 1, 3),
                payment_method: None,
                reference_number: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Payment(PaymentError::AlreadySettled(_))
    ));
}

#[tokio::test]
async fn free_payment_waterfalls_in_chronological_order() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    // 112.00 owed on installment 1, 111.00 on installment 2
    let payment = payment_service
        .record_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: None,
                amount: dec!(150.00),
                payment_date: d(2024, 1, 5),
                payment_method: Some("transfer".to_string()),
                reference_number: Some("OP-1001".to_string()),
                notes: None,
            },
            None,
        )
        .await
        .unwrap();

    // Free mode leaves the payment-level split undetermined
    assert_eq!(payment.principal_paid, None);
    assert_eq!(payment.interest_paid, None);

    let reloaded = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    let schedule = &reloaded.payment_schedule;
    assert_eq!(schedule[0].status(), InstallmentStatus::Paid);
    assert_eq!(schedule[0].paid_amount, dec!(112.00));
    assert_eq!(schedule[1].status(), InstallmentStatus::Partial);
    assert_eq!(schedule[1].paid_amount, dec!(38.00));
    assert!(schedule[2..]
        .iter()
        .all(|i| i.status() == InstallmentStatus::Pending));

    assert_eq!(reloaded.loan.paid_amount, dec!(150.00));
    assert_eq!(reloaded.loan.outstanding_balance, Some(dec!(1128.00)));
}

#[tokio::test]
async fn deferred_payment_is_applied_on_approval_only() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    let submitted = payment_service
        .submit_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: None,
                amount: dec!(112.00),
                payment_date: d(2024, 1, 4),
                payment_method: Some("deposit".to_string()),
                reference_number: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(submitted.status(), PaymentStatus::Pending);

    // Submission alone must not move any balances
    let before = loan_service.get_loan(&created.loan.id).unwrap();
    assert_eq!(before.paid_amount, dec!(0));

    let pending = payment_service.list_pending_payments().unwrap();
    assert_eq!(pending.len(), 1);

    let approved = payment_service.approve_payment(&submitted.id).await.unwrap();
    assert_eq!(approved.status(), PaymentStatus::Approved);

    let after = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    assert_eq!(after.loan.paid_amount, dec!(112.00));
    assert_eq!(after.payment_schedule[0].status(), InstallmentStatus::Paid);

    // A payment transitions exactly once
    let err = payment_service.approve_payment(&submitted.id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Payment(PaymentError::AlreadyProcessed)
    ));
    let err = payment_service.reject_payment(&submitted.id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Payment(PaymentError::AlreadyProcessed)
    ));

    // The double approval changed nothing
    let unchanged = loan_service.get_loan(&created.loan.id).unwrap();
    assert_eq!(unchanged.paid_amount, dec!(112.00));
}

#[tokio::test]
async fn rejected_payment_never_touches_balances() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    let submitted = payment_service
        .submit_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: None,
                amount: dec!(500.00),
                payment_date: d(2024, 1, 4),
                payment_method: None,
                reference_number: None,
                notes: Some("suspicious deposit".to_string()),
            },
            None,
        )
        .await
        .unwrap();

    let rejected = payment_service.reject_payment(&submitted.id).await.unwrap();
    assert_eq!(rejected.status(), PaymentStatus::Rejected);

    let loan = loan_service.get_loan(&created.loan.id).unwrap();
    assert_eq!(loan.paid_amount, dec!(0));
    assert_eq!(loan.outstanding_balance, Some(dec!(1278.00)));

    // Terminal state: approval is no longer possible
    let err = payment_service.approve_payment(&submitted.id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Payment(PaymentError::AlreadyProcessed)
    ));
}

#[tokio::test]
async fn paying_the_full_balance_settles_every_installment() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    // 1278 total, paid across three free payments
    for amount in [dec!(500.00), dec!(500.00), dec!(278.00)] {
        payment_service
            .record_payment(
                NewPayment {
                    loan_id: created.loan.id.clone(),
                    installment_id: None,
                    amount,
                    payment_date: d(2024, 6, 1),
                    payment_method: None,
                    reference_number: None,
                    notes: None,
                },
                None,
            )
            .await
            .unwrap();
    }

    let reloaded = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    assert!(reloaded
        .payment_schedule
        .iter()
        .all(|i| i.status() == InstallmentStatus::Paid));
    assert_eq!(reloaded.loan.paid_amount, dec!(1278.00));
    assert_eq!(reloaded.loan.outstanding_balance, Some(dec!(0.00)));

    let history = payment_service
        .list_payments_for_loan(&created.loan.id)
        .unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn overpayment_is_kept_in_the_loan_aggregate() {
    let (pool, _tmp) = setup_pool();
    let customer_service = CustomerService::new(pool.clone());
    let loan_service = LoanService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());

    let customer = customer_service
        .create_customer(sample_customer())
        .await
        .unwrap();
    let created = loan_service
        .create_loan(sample_loan(&customer.id), None)
        .await
        .unwrap();

    payment_service
        .record_payment(
            NewPayment {
                loan_id: created.loan.id.clone(),
                installment_id: None,
                amount: dec!(1300.00),
                payment_date: d(2024, 6, 1),
                payment_method: None,
                reference_number: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap();

    let reloaded = loan_service.get_loan_with_schedule(&created.loan.id).unwrap();
    assert!(reloaded
        .payment_schedule
        .iter()
        .all(|i| i.status() == InstallmentStatus::Paid));
    assert_eq!(reloaded.loan.paid_amount, dec!(1300.00));
    // Outstanding goes negative under overpayment, by design of the ledger
    assert_eq!(reloaded.loan.outstanding_balance, Some(dec!(-22.00)));
}
