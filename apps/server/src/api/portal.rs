use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use loanbook_core::loans::{Loan, LoanRequest, LoanWithSchedule};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

async fn get_my_loans(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<LoanWithSchedule>>> {
    let customer_id = claims.require_customer()?;

    let loans = state.loan_service.list_loans(None, Some(customer_id))?;
    let mut with_schedules = Vec::with_capacity(loans.len());
    for loan in loans {
        with_schedules.push(state.loan_service.get_loan_with_schedule(&loan.id)?);
    }

    Ok(Json(with_schedules))
}

async fn get_my_loan_detail(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<LoanWithSchedule>> {
    let customer_id = claims.require_customer()?;

    let loan = state.loan_service.get_loan_with_schedule(&id)?;
    if loan.loan.customer_id != customer_id {
        // Do not reveal the loan's existence to other customers
        return Err(ApiError::NotFound(format!("Loan with id {} not found", id)));
    }

    Ok(Json(loan))
}

async fn request_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(request): Json<LoanRequest>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let customer_id = claims.require_customer()?;
    let loan = state.loan_service.request_loan(customer_id, request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portal/loans", get(get_my_loans))
        .route("/portal/loans/{id}", get(get_my_loan_detail))
        .route("/portal/loan-request", post(request_loan))
}
