use serde::{Deserialize, Serialize};

/// Credentials for both back-office and portal logins
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Portal self-registration: binds a password to an existing customer
/// record (matched by DNI) or creates a new one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub dni: String,
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Status filter for loan listings
#[derive(Debug, Deserialize)]
pub struct LoanListQuery {
    pub status: Option<String>,
}
