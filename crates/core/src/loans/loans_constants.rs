/// Loan lifecycle statuses
///
/// A loan starts `pending` (requested, not yet disbursed), becomes `active`
/// once disbursed with a generated schedule, and eventually leaves the book
/// as `closed` or `defaulted`.
pub const LOAN_STATUS_PENDING: &str = "pending";
pub const LOAN_STATUS_ACTIVE: &str = "active";
pub const LOAN_STATUS_CLOSED: &str = "closed";
pub const LOAN_STATUS_DEFAULTED: &str = "defaulted";

/// Installment statuses, monotonic: pending -> partial -> paid
pub const INSTALLMENT_STATUS_PENDING: &str = "pending";
pub const INSTALLMENT_STATUS_PARTIAL: &str = "partial";
pub const INSTALLMENT_STATUS_PAID: &str = "paid";

/// Amortization methods
///
/// Only `fixed_principal` has calculation semantics today; the others are
/// recognized configuration values awaiting implementation.
pub const AMORTIZATION_FIXED_PRINCIPAL: &str = "fixed_principal";
pub const AMORTIZATION_FRENCH: &str = "french";
pub const AMORTIZATION_GERMAN: &str = "german";
pub const AMORTIZATION_AMERICAN: &str = "american";

/// Prefix for generated loan numbers
pub const LOAN_NUMBER_PREFIX: &str = "LN";
