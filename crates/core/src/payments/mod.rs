// Module declarations
pub(crate) mod payment_allocator;
pub(crate) mod payments_errors;
pub(crate) mod payments_model;
pub(crate) mod payments_repository;
pub(crate) mod payments_service;
pub(crate) mod payments_traits;

#[cfg(test)]
mod payment_allocator_tests;

// Re-export the public interface
pub use payment_allocator::{allocate, AllocationPlan};
pub use payments_model::{NewPayment, Payment, PaymentDB, PaymentStatus};
pub use payments_repository::PaymentRepository;
pub use payments_service::PaymentService;
pub use payments_traits::PaymentServiceTrait;

// Re-export error types for convenience
pub use payments_errors::{PaymentError, Result};
