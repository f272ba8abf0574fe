use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::loans_constants::*;
use super::loans_errors::{LoanError, Result};

/// Enum representing the lifecycle status of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Pending,
    Active,
    Closed,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => LOAN_STATUS_PENDING,
            LoanStatus::Active => LOAN_STATUS_ACTIVE,
            LoanStatus::Closed => LOAN_STATUS_CLOSED,
            LoanStatus::Defaulted => LOAN_STATUS_DEFAULTED,
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            LOAN_STATUS_PENDING => Ok(LoanStatus::Pending),
            LOAN_STATUS_ACTIVE => Ok(LoanStatus::Active),
            LOAN_STATUS_CLOSED => Ok(LoanStatus::Closed),
            LOAN_STATUS_DEFAULTED => Ok(LoanStatus::Defaulted),
            other => Err(format!("Unknown loan status: {}", other)),
        }
    }
}

/// Enum representing the settlement status of an installment.
/// Transitions are monotonic: pending -> partial -> paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentStatus {
    Pending,
    Partial,
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => INSTALLMENT_STATUS_PENDING,
            InstallmentStatus::Partial => INSTALLMENT_STATUS_PARTIAL,
            InstallmentStatus::Paid => INSTALLMENT_STATUS_PAID,
        }
    }
}

impl FromStr for InstallmentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            INSTALLMENT_STATUS_PENDING => Ok(InstallmentStatus::Pending),
            INSTALLMENT_STATUS_PARTIAL => Ok(InstallmentStatus::Partial),
            INSTALLMENT_STATUS_PAID => Ok(InstallmentStatus::Paid),
            other => Err(format!("Unknown installment status: {}", other)),
        }
    }
}

/// Enum representing the configured amortization method.
/// Only `FixedPrincipal` is calculable today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmortizationMethod {
    FixedPrincipal,
    French,
    German,
    American,
}

impl AmortizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmortizationMethod::FixedPrincipal => AMORTIZATION_FIXED_PRINCIPAL,
            AmortizationMethod::French => AMORTIZATION_FRENCH,
            AmortizationMethod::German => AMORTIZATION_GERMAN,
            AmortizationMethod::American => AMORTIZATION_AMERICAN,
        }
    }
}

impl FromStr for AmortizationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            AMORTIZATION_FIXED_PRINCIPAL => Ok(AmortizationMethod::FixedPrincipal),
            AMORTIZATION_FRENCH => Ok(AmortizationMethod::French),
            AMORTIZATION_GERMAN => Ok(AmortizationMethod::German),
            AMORTIZATION_AMERICAN => Ok(AmortizationMethod::American),
            other => Err(format!("Unknown amortization method: {}", other)),
        }
    }
}

/// Domain model representing a loan in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub customer_id: String,
    pub loan_number: String,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub amortization_method: String,
    pub late_interest_rate: Decimal,
    pub late_fee_amount: Decimal,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub status: String,
    pub total_amount: Option<Decimal>,
    pub total_interest: Option<Decimal>,
    pub paid_amount: Decimal,
    pub outstanding_balance: Option<Decimal>,
    pub dti_ratio: Option<Decimal>,
    pub version: i32,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        LoanStatus::from_str(&self.status).unwrap_or(LoanStatus::Pending)
    }
}

/// Domain model representing one scheduled installment of a loan.
/// Installments are created in a single batch when the schedule is
/// generated and are never created individually afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: String,
    pub loan_id: String,
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub total_amount: Decimal,
    pub remaining_balance: Decimal,
    pub paid_amount: Decimal,
    pub paid_principal: Decimal,
    pub paid_interest: Decimal,
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub late_fee: Decimal,
    pub late_interest: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Installment {
    pub fn status(&self) -> InstallmentStatus {
        InstallmentStatus::from_str(&self.status).unwrap_or(InstallmentStatus::Pending)
    }

    /// Amount still owed on this installment
    pub fn outstanding(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }
}

/// A loan together with its ordered schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanWithSchedule {
    #[serde(flatten)]
    pub loan: Loan,
    pub payment_schedule: Vec<Installment>,
}

/// Input model for creating a new loan (back-office, disbursed immediately)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub customer_id: String,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
    #[serde(default = "default_amortization_method")]
    pub amortization_method: String,
    #[serde(default)]
    pub late_interest_rate: Decimal,
    #[serde(default)]
    pub late_fee_amount: Decimal,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub notes: Option<String>,
}

fn default_amortization_method() -> String {
    AMORTIZATION_FIXED_PRINCIPAL.to_string()
}

impl NewLoan {
    /// Validates the new loan terms; the schedule calculator assumes
    /// these preconditions hold.
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.trim().is_empty() {
            return Err(LoanError::InvalidData(
                "Customer ID cannot be empty".to_string(),
            ));
        }
        if self.principal_amount <= Decimal::ZERO {
            return Err(LoanError::InvalidData(
                "Principal amount must be positive".to_string(),
            ));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE_HUNDRED {
            return Err(LoanError::InvalidData(
                "Interest rate must be between 0 and 100".to_string(),
            ));
        }
        if self.term_months <= 0 {
            return Err(LoanError::InvalidData(
                "Term must be at least one month".to_string(),
            ));
        }
        if self.late_interest_rate < Decimal::ZERO || self.late_fee_amount < Decimal::ZERO {
            return Err(LoanError::InvalidData(
                "Late charges cannot be negative".to_string(),
            ));
        }
        AmortizationMethod::from_str(&self.amortization_method)
            .map_err(LoanError::InvalidData)?;
        Ok(())
    }
}

/// Input model for a customer-initiated loan request. Creates a `pending`
/// loan without a schedule; disbursement happens later in the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
}

impl LoanRequest {
    pub fn validate(&self) -> Result<()> {
        if self.principal_amount <= Decimal::ZERO {
            return Err(LoanError::InvalidData(
                "Principal amount must be positive".to_string(),
            ));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE_HUNDRED {
            return Err(LoanError::InvalidData(
                "Interest rate must be between 0 and 100".to_string(),
            ));
        }
        if self.term_months <= 0 {
            return Err(LoanError::InvalidData(
                "Term must be at least one month".to_string(),
            ));
        }
        Ok(())
    }
}

/// Database model for loans
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
#[diesel(table_name = crate::schema::loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoanDB {
    pub id: String,
    pub customer_id: String,
    pub loan_number: String,
    pub principal_amount: String,
    pub interest_rate: String,
    pub term_months: i32,
    pub amortization_method: String,
    pub late_interest_rate: String,
    pub late_fee_amount: String,
    pub disbursement_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub status: String,
    pub total_amount: Option<String>,
    pub total_interest: Option<String>,
    pub paid_amount: String,
    pub outstanding_balance: Option<String>,
    pub dti_ratio: Option<String>,
    pub version: i32,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for installments
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Associations,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::installments)]
#[diesel(belongs_to(LoanDB, foreign_key = loan_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstallmentDB {
    pub id: String,
    pub loan_id: String,
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub principal_amount: String,
    pub interest_amount: String,
    pub total_amount: String,
    pub remaining_balance: String,
    pub paid_amount: String,
    pub paid_principal: String,
    pub paid_interest: String,
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub late_fee: String,
    pub late_interest: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<LoanDB> for Loan {
    fn from(db: LoanDB) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            loan_number: db.loan_number,
            principal_amount: Decimal::from_str(&db.principal_amount).unwrap_or_default(),
            interest_rate: Decimal::from_str(&db.interest_rate).unwrap_or_default(),
            term_months: db.term_months,
            amortization_method: db.amortization_method,
            late_interest_rate: Decimal::from_str(&db.late_interest_rate).unwrap_or_default(),
            late_fee_amount: Decimal::from_str(&db.late_fee_amount).unwrap_or_default(),
            disbursement_date: db.disbursement_date,
            first_payment_date: db.first_payment_date,
            maturity_date: db.maturity_date,
            status: db.status,
            total_amount: db.total_amount.and_then(|v| Decimal::from_str(&v).ok()),
            total_interest: db.total_interest.and_then(|v| Decimal::from_str(&v).ok()),
            paid_amount: Decimal::from_str(&db.paid_amount).unwrap_or_default(),
            outstanding_balance: db
                .outstanding_balance
                .and_then(|v| Decimal::from_str(&v).ok()),
            dti_ratio: db.dti_ratio.and_then(|v| Decimal::from_str(&v).ok()),
            version: db.version,
            notes: db.notes,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Loan> for LoanDB {
    fn from(domain: Loan) -> Self {
        Self {
            id: domain.id,
            customer_id: domain.customer_id,
            loan_number: domain.loan_number,
            principal_amount: domain.principal_amount.to_string(),
            interest_rate: domain.interest_rate.to_string(),
            term_months: domain.term_months,
            amortization_method: domain.amortization_method,
            late_interest_rate: domain.late_interest_rate.to_string(),
            late_fee_amount: domain.late_fee_amount.to_string(),
            disbursement_date: domain.disbursement_date,
            first_payment_date: domain.first_payment_date,
            maturity_date: domain.maturity_date,
            status: domain.status,
            total_amount: domain.total_amount.map(|v| v.to_string()),
            total_interest: domain.total_interest.map(|v| v.to_string()),
            paid_amount: domain.paid_amount.to_string(),
            outstanding_balance: domain.outstanding_balance.map(|v| v.to_string()),
            dti_ratio: domain.dti_ratio.map(|v| v.to_string()),
            version: domain.version,
            notes: domain.notes,
            created_by: domain.created_by,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<InstallmentDB> for Installment {
    fn from(db: InstallmentDB) -> Self {
        Self {
            id: db.id,
            loan_id: db.loan_id,
            installment_number: db.installment_number,
            due_date: db.due_date,
            principal_amount: Decimal::from_str(&db.principal_amount).unwrap_or_default(),
            interest_amount: Decimal::from_str(&db.interest_amount).unwrap_or_default(),
            total_amount: Decimal::from_str(&db.total_amount).unwrap_or_default(),
            remaining_balance: Decimal::from_str(&db.remaining_balance).unwrap_or_default(),
            paid_amount: Decimal::from_str(&db.paid_amount).unwrap_or_default(),
            paid_principal: Decimal::from_str(&db.paid_principal).unwrap_or_default(),
            paid_interest: Decimal::from_str(&db.paid_interest).unwrap_or_default(),
            status: db.status,
            paid_date: db.paid_date,
            late_fee: Decimal::from_str(&db.late_fee).unwrap_or_default(),
            late_interest: Decimal::from_str(&db.late_interest).unwrap_or_default(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Installment> for InstallmentDB {
    fn from(domain: Installment) -> Self {
        Self {
            id: domain.id,
            loan_id: domain.loan_id,
            installment_number: domain.installment_number,
            due_date: domain.due_date,
            principal_amount: domain.principal_amount.to_string(),
            interest_amount: domain.interest_amount.to_string(),
            total_amount: domain.total_amount.to_string(),
            remaining_balance: domain.remaining_balance.to_string(),
            paid_amount: domain.paid_amount.to_string(),
            paid_principal: domain.paid_principal.to_string(),
            paid_interest: domain.paid_interest.to_string(),
            status: domain.status,
            paid_date: domain.paid_date,
            late_fee: domain.late_fee.to_string(),
            late_interest: domain.late_interest.to_string(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
