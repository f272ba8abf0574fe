use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use loanbook_core::customers::{CustomerError, CustomerUpdate, NewCustomer};
use loanbook_core::users::UserError;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Back-office login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .user_repository
        .get_by_email(&credentials.email)
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            other => ApiError::from(other),
        })?;

    if !verify_password(&credentials.password, &user.password_hash) {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if !user.is_active {
        return Err(ApiError::Forbidden("User is inactive".to_string()));
    }

    let token = state.auth.issue_token(&user.email, user.role(), None)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Customer portal login
async fn customer_login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let customer = state
        .customer_service
        .get_customer_by_email(&credentials.email)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let stored_hash = customer
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    if !verify_password(&credentials.password, stored_hash) {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if !customer.is_active {
        return Err(ApiError::Forbidden("Customer is inactive".to_string()));
    }

    let token = state.auth.issue_token(
        credentials.email.as_str(),
        loanbook_core::users::UserRole::Customer,
        Some(customer.id),
    )?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Portal self-registration. An existing customer record without a portal
/// password (created in the back office) gets one bound to it; otherwise
/// a fresh customer record is created.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    match state.customer_service.get_customer_by_dni(&registration.dni) {
        Ok(existing) => {
            if existing.password_hash.is_some() {
                return Err(ApiError::Conflict(
                    "DNI already registered; log in instead".to_string(),
                ));
            }

            let hash = hash_password(&registration.password)?;
            state
                .customer_service
                .set_customer_password(&existing.id, &hash)
                .await?;
            state
                .customer_service
                .update_customer(
                    &existing.id,
                    CustomerUpdate {
                        full_name: None,
                        phone: registration.phone.clone(),
                        email: Some(registration.email.clone()),
                        address: None,
                        monthly_income: None,
                        employment_status: None,
                        employer_name: None,
                        credit_score: None,
                    },
                )
                .await?;

            let token = state.auth.issue_token(
                &registration.email,
                loanbook_core::users::UserRole::Customer,
                Some(existing.id),
            )?;
            Ok(Json(TokenResponse::bearer(token)))
        }
        Err(loanbook_core::Error::Customer(CustomerError::NotFound(_))) => {
            if state
                .customer_service
                .get_customer_by_email(&registration.email)
                .is_ok()
            {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }

            let full_name = registration
                .full_name
                .clone()
                .ok_or_else(|| ApiError::BadRequest("Full name is required".to_string()))?;

            let customer = state
                .customer_service
                .create_customer(NewCustomer {
                    dni: registration.dni.clone(),
                    full_name,
                    phone: registration.phone.clone(),
                    email: Some(registration.email.clone()),
                    address: None,
                    monthly_income: None,
                    employment_status: None,
                    employer_name: None,
                    credit_score: None,
                })
                .await?;

            let hash = hash_password(&registration.password)?;
            state
                .customer_service
                .set_customer_password(&customer.id, &hash)
                .await?;

            let token = state.auth.issue_token(
                &registration.email,
                loanbook_core::users::UserRole::Customer,
                Some(customer.id),
            )?;
            Ok(Json(TokenResponse::bearer(token)))
        }
        Err(other) => Err(other.into()),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/customer/login", post(customer_login))
        .route("/auth/register", post(register))
}
