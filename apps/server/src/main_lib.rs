use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use loanbook_core::customers::{CustomerService, CustomerServiceTrait};
use loanbook_core::db;
use loanbook_core::loans::{LoanService, LoanServiceTrait};
use loanbook_core::payments::{PaymentService, PaymentServiceTrait};
use loanbook_core::users::{NewUser, UserError, UserRepository, UserRole};

use crate::auth::{hash_password, AuthManager};
use crate::config::Config;

pub struct AppState {
    pub customer_service: Arc<dyn CustomerServiceTrait>,
    pub loan_service: Arc<dyn LoanServiceTrait>,
    pub payment_service: Arc<dyn PaymentServiceTrait>,
    pub user_repository: Arc<UserRepository>,
    pub auth: Arc<AuthManager>,
    pub db_path: String,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;

    let user_repository = Arc::new(UserRepository::new(pool.clone()));
    seed_admin_user(config, &user_repository)?;

    let state = AppState {
        customer_service: Arc::new(CustomerService::new(pool.clone())),
        loan_service: Arc::new(LoanService::new(pool.clone())),
        payment_service: Arc::new(PaymentService::new(pool.clone())),
        user_repository,
        auth: Arc::new(AuthManager::new(&config.jwt_secret)),
        db_path,
    };

    Ok(Arc::new(state))
}

/// Creates the bootstrap admin account when configured and missing.
fn seed_admin_user(config: &Config, repository: &UserRepository) -> anyhow::Result<()> {
    let (email, password) = match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Ok(()),
    };

    match repository.get_by_email(email) {
        Ok(_) => Ok(()),
        Err(UserError::NotFound(_)) => {
            let password_hash = hash_password(password)
                .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
            repository.create(NewUser {
                email: email.clone(),
                password_hash,
                full_name: "Administrator".to_string(),
                role: UserRole::Admin.as_str().to_string(),
            })?;
            tracing::info!("Seeded admin user {}", email);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
