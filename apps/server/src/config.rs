/// Server configuration, read from the environment.
///
/// `LB_*` variables override the defaults; a `.env` file is honored in
/// development.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub data_dir: String,
    pub jwt_secret: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            listen_addr: std::env::var("LB_LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            data_dir: std::env::var("LB_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            jwt_secret: std::env::var("LB_JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            admin_email: std::env::var("LB_ADMIN_EMAIL").ok(),
            admin_password: std::env::var("LB_ADMIN_PASSWORD").ok(),
        }
    }
}
