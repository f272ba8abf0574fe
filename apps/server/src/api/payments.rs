use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use loanbook_core::payments::{NewPayment, Payment};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Back-office payment registration: applied to the schedule immediately.
async fn create_payment_admin(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(new_payment): Json<NewPayment>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    claims.require_admin()?;

    let creator = state.user_repository.get_by_email(&claims.sub)?;
    let payment = state
        .payment_service
        .record_payment(new_payment, Some(creator.id))
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Customer payment registration against their own loan. Same allocation
/// path as the back-office route; only the authorization differs.
async fn create_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(new_payment): Json<NewPayment>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let customer_id = claims.require_customer()?;

    let loan = state.loan_service.get_loan(&new_payment.loan_id)?;
    if loan.customer_id != customer_id {
        return Err(ApiError::Forbidden(
            "Loan does not belong to this customer".to_string(),
        ));
    }

    let payment = state.payment_service.record_payment(new_payment, None).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn approve_payment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Payment>> {
    claims.require_admin()?;
    let payment = state.payment_service.approve_payment(&id).await?;
    Ok(Json(payment))
}

async fn reject_payment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Payment>> {
    claims.require_admin()?;
    let payment = state.payment_service.reject_payment(&id).await?;
    Ok(Json(payment))
}

async fn get_payments_by_loan(
    Path(loan_id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<Payment>>> {
    claims.require_admin()?;
    let payments = state.payment_service.list_payments_for_loan(&loan_id)?;
    Ok(Json(payments))
}

async fn get_pending_payments(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<Payment>>> {
    claims.require_admin()?;
    let payments = state.payment_service.list_pending_payments()?;
    Ok(Json(payments))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/admin", post(create_payment_admin))
        .route("/payments/{id}/approve", put(approve_payment))
        .route("/payments/{id}/reject", put(reject_payment))
        .route("/payments/loan/{loan_id}", get(get_payments_by_loan))
        .route("/payments/pending", get(get_pending_payments))
}
