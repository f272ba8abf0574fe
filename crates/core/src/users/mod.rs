// Module declarations
pub(crate) mod users_errors;
pub(crate) mod users_model;
pub(crate) mod users_repository;

// Re-export the public interface
pub use users_model::{NewUser, User, UserDB, UserRole};
pub use users_repository::UserRepository;

// Re-export error types for convenience
pub use users_errors::{Result, UserError};
