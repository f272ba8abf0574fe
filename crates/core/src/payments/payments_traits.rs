use async_trait::async_trait;

use super::payments_model::{NewPayment, Payment};
use crate::errors::Result;

/// Trait defining the contract for Payment service operations.
///
/// `record_payment` and `approve_payment` run the identical allocation
/// algorithm; they are two entry points into one code path, not two
/// implementations.
#[async_trait]
pub trait PaymentServiceTrait: Send + Sync {
    /// Registers a payment with immediate approval: allocates it against
    /// the schedule and persists every mutation atomically.
    async fn record_payment(
        &self,
        new_payment: NewPayment,
        created_by: Option<String>,
    ) -> Result<Payment>;

    /// Registers a payment in `pending` state. No installment or loan
    /// state is touched until the payment is approved.
    async fn submit_payment(
        &self,
        new_payment: NewPayment,
        created_by: Option<String>,
    ) -> Result<Payment>;

    /// Approves a pending payment, applying the same allocation logic as
    /// `record_payment` against the loan's current state.
    async fn approve_payment(&self, payment_id: &str) -> Result<Payment>;

    /// Rejects a pending payment without touching any balances.
    async fn reject_payment(&self, payment_id: &str) -> Result<Payment>;

    /// Retrieves a payment by ID.
    fn get_payment(&self, payment_id: &str) -> Result<Payment>;

    /// Lists the payment history of a loan.
    fn list_payments_for_loan(&self, loan_id: &str) -> Result<Vec<Payment>>;

    /// Lists payments awaiting approval.
    fn list_pending_payments(&self) -> Result<Vec<Payment>>;
}
