use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::payments_errors::{PaymentError, Result};

/// Payment statuses. `pending` may transition exactly once, to either
/// `approved` or `rejected`; both are terminal.
pub const PAYMENT_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUS_APPROVED: &str = "approved";
pub const PAYMENT_STATUS_REJECTED: &str = "rejected";

/// Enum representing the status of a payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => PAYMENT_STATUS_PENDING,
            PaymentStatus::Approved => PAYMENT_STATUS_APPROVED,
            PaymentStatus::Rejected => PAYMENT_STATUS_REJECTED,
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            PAYMENT_STATUS_PENDING => Ok(PaymentStatus::Pending),
            PAYMENT_STATUS_APPROVED => Ok(PaymentStatus::Approved),
            PAYMENT_STATUS_REJECTED => Ok(PaymentStatus::Rejected),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// Domain model representing one immutable settlement record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub loan_id: String,
    pub installment_id: Option<String>,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub principal_paid: Option<Decimal>,
    pub interest_paid: Option<Decimal>,
    pub late_fee_paid: Decimal,
    pub late_interest_paid: Decimal,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Payment {
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status).unwrap_or(PaymentStatus::Pending)
    }
}

/// Input model for registering a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub loan_id: String,
    pub installment_id: Option<String>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl NewPayment {
    /// Validates the payment request data
    pub fn validate(&self) -> Result<()> {
        if self.loan_id.trim().is_empty() {
            return Err(PaymentError::InvalidData(
                "Loan ID cannot be empty".to_string(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidData(
                "Payment amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for payments
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentDB {
    pub id: String,
    pub loan_id: String,
    pub installment_id: Option<String>,
    pub payment_date: NaiveDate,
    pub amount: String,
    pub principal_paid: Option<String>,
    pub interest_paid: Option<String>,
    pub late_fee_paid: String,
    pub late_interest_paid: String,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

// Conversion implementations
impl From<PaymentDB> for Payment {
    fn from(db: PaymentDB) -> Self {
        Self {
            id: db.id,
            loan_id: db.loan_id,
            installment_id: db.installment_id,
            payment_date: db.payment_date,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            principal_paid: db.principal_paid.and_then(|v| Decimal::from_str(&v).ok()),
            interest_paid: db.interest_paid.and_then(|v| Decimal::from_str(&v).ok()),
            late_fee_paid: Decimal::from_str(&db.late_fee_paid).unwrap_or_default(),
            late_interest_paid: Decimal::from_str(&db.late_interest_paid).unwrap_or_default(),
            payment_method: db.payment_method,
            reference_number: db.reference_number,
            notes: db.notes,
            status: db.status,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}

impl From<Payment> for PaymentDB {
    fn from(domain: Payment) -> Self {
        Self {
            id: domain.id,
            loan_id: domain.loan_id,
            installment_id: domain.installment_id,
            payment_date: domain.payment_date,
            amount: domain.amount.to_string(),
            principal_paid: domain.principal_paid.map(|v| v.to_string()),
            interest_paid: domain.interest_paid.map(|v| v.to_string()),
            late_fee_paid: domain.late_fee_paid.to_string(),
            late_interest_paid: domain.late_interest_paid.to_string(),
            payment_method: domain.payment_method,
            reference_number: domain.reference_number,
            notes: domain.notes,
            status: domain.status,
            created_by: domain.created_by,
            created_at: domain.created_at,
        }
    }
}
