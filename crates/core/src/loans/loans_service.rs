use chrono::Utc;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::loans_constants::LOAN_NUMBER_PREFIX;
use super::loans_model::{
    AmortizationMethod, Installment, InstallmentStatus, Loan, LoanRequest, LoanStatus,
    LoanWithSchedule, NewLoan,
};
use super::loans_repository::LoanRepository;
use super::loans_traits::LoanServiceTrait;
use super::schedule_calculator::{build_schedule, debt_to_income_ratio, GeneratedSchedule};
use crate::customers::CustomerRepository;
use crate::errors::Result;
use crate::loans::LoanError;

/// Service for managing loans and their schedules
pub struct LoanService {
    repository: LoanRepository,
    customer_repository: CustomerRepository,
}

impl LoanService {
    /// Creates a new LoanService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: LoanRepository::new(pool.clone()),
            customer_repository: CustomerRepository::new(pool),
        }
    }

    fn loan_number_for(loan_id: &str) -> String {
        let short = loan_id.get(..8).unwrap_or(loan_id);
        format!("{}-{}", LOAN_NUMBER_PREFIX, short.to_uppercase())
    }

    fn installments_from(
        loan_id: &str,
        schedule: &GeneratedSchedule,
    ) -> Vec<Installment> {
        let now = Utc::now().naive_utc();
        schedule
            .entries
            .iter()
            .map(|entry| Installment {
                id: uuid::Uuid::new_v4().to_string(),
                loan_id: loan_id.to_string(),
                installment_number: entry.installment_number,
                due_date: entry.due_date,
                principal_amount: entry.principal_amount,
                interest_amount: entry.interest_amount,
                total_amount: entry.total_amount,
                remaining_balance: entry.remaining_balance,
                paid_amount: Decimal::ZERO,
                paid_principal: Decimal::ZERO,
                paid_interest: Decimal::ZERO,
                status: InstallmentStatus::Pending.as_str().to_string(),
                paid_date: None,
                late_fee: Decimal::ZERO,
                late_interest: Decimal::ZERO,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl LoanServiceTrait for LoanService {
    /// Creates a disbursed loan: validates terms, runs the schedule
    /// calculator once, and persists loan plus installments atomically.
    async fn create_loan(
        &self,
        new_loan: NewLoan,
        created_by: Option<String>,
    ) -> Result<LoanWithSchedule> {
        new_loan.validate()?;

        let method = AmortizationMethod::from_str(&new_loan.amortization_method)
            .map_err(LoanError::InvalidData)?;
        if method != AmortizationMethod::FixedPrincipal {
            // TODO: implement the french (annuity) variant once product
            // signs off on its rounding rules.
            return Err(
                LoanError::UnsupportedAmortizationMethod(new_loan.amortization_method).into(),
            );
        }

        let customer = self.customer_repository.get_by_id(&new_loan.customer_id)?;

        let schedule = build_schedule(
            new_loan.principal_amount,
            new_loan.interest_rate,
            new_loan.term_months,
            new_loan.first_payment_date,
        );

        let dti_ratio = debt_to_income_ratio(
            schedule.total_amount,
            new_loan.term_months,
            customer.monthly_income,
        );

        debug!(
            "Creating loan for customer {}: principal {}, {} installments, total {}",
            customer.id,
            new_loan.principal_amount,
            schedule.entries.len(),
            schedule.total_amount
        );

        let now = Utc::now().naive_utc();
        let loan_id = uuid::Uuid::new_v4().to_string();
        let loan = Loan {
            id: loan_id.clone(),
            customer_id: new_loan.customer_id,
            loan_number: Self::loan_number_for(&loan_id),
            principal_amount: new_loan.principal_amount,
            interest_rate: new_loan.interest_rate,
            term_months: new_loan.term_months,
            amortization_method: new_loan.amortization_method,
            late_interest_rate: new_loan.late_interest_rate,
            late_fee_amount: new_loan.late_fee_amount,
            disbursement_date: new_loan.disbursement_date,
            first_payment_date: new_loan.first_payment_date,
            maturity_date: schedule.maturity_date,
            status: LoanStatus::Active.as_str().to_string(),
            total_amount: Some(schedule.total_amount),
            total_interest: Some(schedule.total_interest),
            paid_amount: Decimal::ZERO,
            outstanding_balance: Some(schedule.total_amount),
            dti_ratio,
            version: 1,
            notes: new_loan.notes,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let installments = Self::installments_from(&loan_id, &schedule);

        Ok(self.repository.create_with_schedule(
            loan.into(),
            installments.into_iter().map(Into::into).collect(),
        )?)
    }

    /// Records a customer-initiated loan request as a pending loan.
    /// No schedule is generated until the loan is disbursed.
    async fn request_loan(&self, customer_id: &str, request: LoanRequest) -> Result<Loan> {
        request.validate()?;

        let customer = self.customer_repository.get_by_id(customer_id)?;

        let now = Utc::now().naive_utc();
        let loan_id = uuid::Uuid::new_v4().to_string();
        let loan = Loan {
            id: loan_id.clone(),
            customer_id: customer.id,
            loan_number: Self::loan_number_for(&loan_id),
            principal_amount: request.principal_amount,
            interest_rate: request.interest_rate,
            term_months: request.term_months,
            amortization_method: AmortizationMethod::FixedPrincipal.as_str().to_string(),
            late_interest_rate: Decimal::ZERO,
            late_fee_amount: Decimal::ZERO,
            disbursement_date: request.disbursement_date,
            first_payment_date: request.first_payment_date,
            maturity_date: crate::utils::time_utils::add_months(
                request.first_payment_date,
                (request.term_months - 1) as u32,
            ),
            status: LoanStatus::Pending.as_str().to_string(),
            total_amount: None,
            total_interest: None,
            paid_amount: Decimal::ZERO,
            outstanding_balance: None,
            dti_ratio: None,
            version: 1,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        Ok(self.repository.create_pending(loan.into())?)
    }

    /// Retrieves a loan by its ID
    fn get_loan(&self, loan_id: &str) -> Result<Loan> {
        Ok(self.repository.get_by_id(loan_id)?)
    }

    /// Retrieves a loan together with its ordered schedule
    fn get_loan_with_schedule(&self, loan_id: &str) -> Result<LoanWithSchedule> {
        let loan = self.repository.get_by_id(loan_id)?;
        let payment_schedule = self.repository.installments_for_loan(loan_id)?;
        Ok(LoanWithSchedule {
            loan,
            payment_schedule,
        })
    }

    /// Lists loans with optional status and customer filters
    fn list_loans(
        &self,
        status_filter: Option<&str>,
        customer_filter: Option<&str>,
    ) -> Result<Vec<Loan>> {
        Ok(self.repository.list(status_filter, customer_filter)?)
    }
}
