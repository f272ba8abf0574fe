use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use loanbook_core::customers::CustomerError;
use loanbook_core::loans::LoanError;
use loanbook_core::payments::PaymentError;
use loanbook_core::users::UserError;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing error type. Core errors are mapped to distinguishable
/// status codes here so handlers can just use `?`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<loanbook_core::Error> for ApiError {
    fn from(err: loanbook_core::Error) -> Self {
        use loanbook_core::Error;

        match err {
            Error::Validation(e) => ApiError::BadRequest(e.to_string()),
            Error::Customer(CustomerError::NotFound(msg)) => ApiError::NotFound(msg),
            Error::Customer(CustomerError::InvalidData(msg)) => ApiError::BadRequest(msg),
            Error::Customer(CustomerError::AlreadyExists(msg)) => ApiError::Conflict(msg),
            Error::Loan(LoanError::NotFound(msg)) => ApiError::NotFound(msg),
            Error::Loan(LoanError::InvalidData(msg)) => ApiError::BadRequest(msg),
            Error::Loan(e @ LoanError::UnsupportedAmortizationMethod(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            Error::Payment(PaymentError::NotFound(msg)) => ApiError::NotFound(msg),
            Error::Payment(e @ PaymentError::InstallmentNotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            Error::Payment(e @ PaymentError::AlreadySettled(_)) => {
                ApiError::Conflict(e.to_string())
            }
            Error::Payment(e @ PaymentError::AmountMismatch { .. }) => {
                ApiError::BadRequest(e.to_string())
            }
            Error::Payment(e @ PaymentError::AlreadyProcessed) => {
                ApiError::Conflict(e.to_string())
            }
            Error::Payment(PaymentError::InvalidData(msg)) => ApiError::BadRequest(msg),
            Error::User(UserError::NotFound(msg)) => ApiError::NotFound(msg),
            Error::User(UserError::InvalidData(msg)) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        ApiError::from(loanbook_core::Error::Customer(err))
    }
}

impl From<LoanError> for ApiError {
    fn from(err: LoanError) -> Self {
        ApiError::from(loanbook_core::Error::Loan(err))
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::from(loanbook_core::Error::Payment(err))
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::from(loanbook_core::Error::User(err))
    }
}
