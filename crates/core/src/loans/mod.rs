// Module declarations
pub(crate) mod loans_constants;
pub(crate) mod loans_errors;
pub(crate) mod loans_model;
pub(crate) mod loans_repository;
pub(crate) mod loans_service;
pub(crate) mod loans_traits;
pub(crate) mod schedule_calculator;


// Re-export the public interface
pub use loans_constants::*;
pub use loans_model::{
    AmortizationMethod, Installment, InstallmentDB, InstallmentStatus, Loan, LoanDB, LoanRequest,
    LoanStatus, LoanWithSchedule, NewLoan,
};
pub use loans_repository::LoanRepository;
pub use loans_service::LoanService;
pub use loans_traits::LoanServiceTrait;
pub use schedule_calculator::{build_schedule, debt_to_income_ratio, GeneratedSchedule, ScheduleEntry};

// Re-export error types for convenience
pub use loans_errors::{LoanError, Result};
