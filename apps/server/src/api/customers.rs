use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use loanbook_core::customers::{Customer, CustomerUpdate, NewCustomer};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::main_lib::AppState;

async fn create_customer(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(new_customer): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    claims.require_admin()?;
    let customer = state.customer_service.create_customer(new_customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<Customer>>> {
    claims.require_admin()?;
    let customers = state.customer_service.list_customers(Some(true))?;
    Ok(Json(customers))
}

async fn get_customer(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Customer>> {
    claims.require_admin()?;
    let customer = state.customer_service.get_customer(&id)?;
    Ok(Json(customer))
}

async fn get_customer_by_dni(
    Path(dni): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Customer>> {
    claims.require_admin()?;
    let customer = state.customer_service.get_customer_by_dni(&dni)?;
    Ok(Json(customer))
}

async fn update_customer(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(update): Json<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    claims.require_admin()?;
    let customer = state.customer_service.update_customer(&id, update).await?;
    Ok(Json(customer))
}

async fn deactivate_customer(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<StatusCode> {
    claims.require_admin()?;
    state.customer_service.deactivate_customer(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer)
                .put(update_customer)
                .delete(deactivate_customer),
        )
        .route("/customers/dni/{dni}", get(get_customer_by_dni))
}
