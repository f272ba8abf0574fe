use chrono::Utc;
use dashmap::DashMap;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::payment_allocator::{allocate, AllocationPlan};
use super::payments_model::{NewPayment, Payment, PaymentStatus};
use super::payments_repository::PaymentRepository;
use super::payments_traits::PaymentServiceTrait;
use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::loans::LoanRepository;
use crate::payments::PaymentError;

/// Service applying payments to loans.
///
/// Every allocation runs under a per-loan mutex and inside a single
/// database transaction: installment mutations, the payment record, and
/// the loan aggregate update commit together or not at all.
pub struct PaymentService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    repository: PaymentRepository,
    loan_repository: LoanRepository,
    loan_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PaymentService {
    /// Creates a new PaymentService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: PaymentRepository::new(pool.clone()),
            loan_repository: LoanRepository::new(pool.clone()),
            pool,
            loan_locks: DashMap::new(),
        }
    }

    fn lock_for_loan(&self, loan_id: &str) -> Arc<Mutex<()>> {
        self.loan_locks
            .entry(loan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Loads the loan and its schedule, allocates the amount, and
    /// persists the resulting plan. Runs inside the caller's transaction;
    /// the caller must hold the loan's lock.
    fn allocate_in_transaction(
        conn: &mut SqliteConnection,
        loan_id: &str,
        amount: Decimal,
        target_installment_id: Option<&str>,
        payment_date: chrono::NaiveDate,
    ) -> Result<AllocationPlan> {
        let loan = LoanRepository::get_by_id_in_transaction(conn, loan_id)?;
        let schedule = LoanRepository::installments_for_loan_in_transaction(conn, loan_id)?;

        let plan = allocate(&loan, &schedule, amount, target_installment_id, payment_date)?;

        for installment in plan.installments.clone() {
            LoanRepository::update_installment_in_transaction(conn, installment)?;
        }

        LoanRepository::update_aggregates_in_transaction(
            conn,
            loan_id,
            loan.version,
            plan.loan_paid_amount,
            plan.loan_outstanding_balance,
        )?;

        Ok(plan)
    }
}

#[async_trait::async_trait]
impl PaymentServiceTrait for PaymentService {
    /// Registers a payment with immediate approval
    async fn record_payment(
        &self,
        new_payment: NewPayment,
        created_by: Option<String>,
    ) -> Result<Payment> {
        new_payment.validate()?;

        let lock = self.lock_for_loan(&new_payment.loan_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        let payment = conn.transaction::<Payment, Error, _>(|conn| {
            let plan = Self::allocate_in_transaction(
                conn,
                &new_payment.loan_id,
                new_payment.amount,
                new_payment.installment_id.as_deref(),
                new_payment.payment_date,
            )?;

            let payment = Payment {
                id: uuid::Uuid::new_v4().to_string(),
                loan_id: new_payment.loan_id,
                installment_id: new_payment.installment_id,
                payment_date: new_payment.payment_date,
                amount: new_payment.amount,
                principal_paid: plan.principal_paid,
                interest_paid: plan.interest_paid,
                late_fee_paid: Decimal::ZERO,
                late_interest_paid: Decimal::ZERO,
                payment_method: new_payment.payment_method,
                reference_number: new_payment.reference_number,
                notes: new_payment.notes,
                status: PaymentStatus::Approved.as_str().to_string(),
                created_by,
                created_at: Utc::now().naive_utc(),
            };

            PaymentRepository::create_in_transaction(conn, &payment.clone().into())?;

            Ok(payment)
        })?;

        debug!(
            "Recorded payment {} of {} on loan {}",
            payment.id, payment.amount, payment.loan_id
        );

        Ok(payment)
    }

    /// Registers a payment in pending state; balances stay untouched
    async fn submit_payment(
        &self,
        new_payment: NewPayment,
        created_by: Option<String>,
    ) -> Result<Payment> {
        new_payment.validate()?;

        // The loan must exist even though nothing is allocated yet
        self.loan_repository.get_by_id(&new_payment.loan_id)?;

        let payment = Payment {
            id: uuid::Uuid::new_v4().to_string(),
            loan_id: new_payment.loan_id,
            installment_id: new_payment.installment_id,
            payment_date: new_payment.payment_date,
            amount: new_payment.amount,
            principal_paid: None,
            interest_paid: None,
            late_fee_paid: Decimal::ZERO,
            late_interest_paid: Decimal::ZERO,
            payment_method: new_payment.payment_method,
            reference_number: new_payment.reference_number,
            notes: new_payment.notes,
            status: PaymentStatus::Pending.as_str().to_string(),
            created_by,
            created_at: Utc::now().naive_utc(),
        };

        let mut conn = get_connection(&self.pool)?;
        PaymentRepository::create_in_transaction(&mut conn, &payment.clone().into())?;

        Ok(payment)
    }

    /// Approves a pending payment by running the same allocation logic
    /// as `record_payment` against the loan's current state
    async fn approve_payment(&self, payment_id: &str) -> Result<Payment> {
        let payment = self.repository.get_by_id(payment_id)?;
        if payment.status() != PaymentStatus::Pending {
            return Err(PaymentError::AlreadyProcessed.into());
        }

        let lock = self.lock_for_loan(&payment.loan_id);
        let _guard = lock.lock().await;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<(), Error, _>(|conn| {
            let plan = Self::allocate_in_transaction(
                conn,
                &payment.loan_id,
                payment.amount,
                payment.installment_id.as_deref(),
                payment.payment_date,
            )?;

            PaymentRepository::approve_in_transaction(
                conn,
                payment_id,
                plan.principal_paid,
                plan.interest_paid,
            )?;

            Ok(())
        })?;

        debug!("Approved payment {} on loan {}", payment_id, payment.loan_id);

        Ok(self.repository.get_by_id(payment_id)?)
    }

    /// Rejects a pending payment; no balances are touched
    async fn reject_payment(&self, payment_id: &str) -> Result<Payment> {
        Ok(self.repository.mark_rejected(payment_id)?)
    }

    /// Retrieves a payment by its ID
    fn get_payment(&self, payment_id: &str) -> Result<Payment> {
        Ok(self.repository.get_by_id(payment_id)?)
    }

    /// Lists the payment history of a loan
    fn list_payments_for_loan(&self, loan_id: &str) -> Result<Vec<Payment>> {
        Ok(self.repository.list_by_loan(loan_id)?)
    }

    /// Lists payments awaiting approval
    fn list_pending_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.repository.list_pending()?)
    }
}
