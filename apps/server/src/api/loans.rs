use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use loanbook_core::loans::{Loan, LoanWithSchedule, NewLoan};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::main_lib::AppState;
use crate::models::LoanListQuery;

async fn create_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(new_loan): Json<NewLoan>,
) -> ApiResult<(StatusCode, Json<LoanWithSchedule>)> {
    claims.require_admin()?;

    let creator = state.user_repository.get_by_email(&claims.sub)?;
    let created = state
        .loan_service
        .create_loan(new_loan, Some(creator.id))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_loans(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<LoanListQuery>,
) -> ApiResult<Json<Vec<Loan>>> {
    claims.require_admin()?;
    let loans = state
        .loan_service
        .list_loans(query.status.as_deref(), None)?;
    Ok(Json(loans))
}

async fn get_loan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<LoanWithSchedule>> {
    claims.require_admin()?;
    let loan = state.loan_service.get_loan_with_schedule(&id)?;
    Ok(Json(loan))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/{id}", get(get_loan))
}
