use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for payment-related operations.
///
/// Allocation failures are detected before any mutation is applied, so a
/// failed payment leaves installment and loan state untouched.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Installment not found: {0}")]
    InstallmentNotFound(String),
    #[error("Installment {0} is already paid")]
    AlreadySettled(String),
    #[error("Payment amount must be {expected}")]
    AmountMismatch { expected: Decimal },
    #[error("Payment has already been processed")]
    AlreadyProcessed,
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for PaymentError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PaymentError::NotFound("Record not found".to_string()),
            _ => PaymentError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for payment operations
pub type Result<T> = std::result::Result<T, PaymentError>;
