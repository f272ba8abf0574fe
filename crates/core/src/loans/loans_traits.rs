use async_trait::async_trait;

use super::loans_model::{Loan, LoanRequest, LoanWithSchedule, NewLoan};
use crate::errors::Result;

/// Trait defining the contract for Loan service operations.
#[async_trait]
pub trait LoanServiceTrait: Send + Sync {
    /// Creates a disbursed loan: validates the terms, generates the full
    /// amortization schedule, and persists both atomically.
    async fn create_loan(
        &self,
        new_loan: NewLoan,
        created_by: Option<String>,
    ) -> Result<LoanWithSchedule>;

    /// Records a customer-initiated loan request as a pending loan
    /// without a schedule.
    async fn request_loan(&self, customer_id: &str, request: LoanRequest) -> Result<Loan>;

    /// Retrieves a loan by ID.
    fn get_loan(&self, loan_id: &str) -> Result<Loan>;

    /// Retrieves a loan together with its ordered schedule.
    fn get_loan_with_schedule(&self, loan_id: &str) -> Result<LoanWithSchedule>;

    /// Lists loans with optional status and customer filters.
    fn list_loans(
        &self,
        status_filter: Option<&str>,
        customer_filter: Option<&str>,
    ) -> Result<Vec<Loan>>;
}
