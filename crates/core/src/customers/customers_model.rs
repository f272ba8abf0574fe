use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::customers_errors::{CustomerError, Result};

/// Domain model representing a customer in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub dni: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub credit_score: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub dni: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub credit_score: Option<i32>,
}

impl NewCustomer {
    /// Validates the new customer data
    pub fn validate(&self) -> Result<()> {
        let dni = self.dni.trim();
        if dni.len() < 8 || dni.len() > 20 {
            return Err(CustomerError::InvalidData(
                "DNI must be between 8 and 20 characters".to_string(),
            ));
        }
        if self.full_name.trim().is_empty() {
            return Err(CustomerError::InvalidData(
                "Full name cannot be empty".to_string(),
            ));
        }
        if let Some(income) = self.monthly_income {
            if income < Decimal::ZERO {
                return Err(CustomerError::InvalidData(
                    "Monthly income cannot be negative".to_string(),
                ));
            }
        }
        if let Some(score) = self.credit_score {
            if !(0..=1000).contains(&score) {
                return Err(CustomerError::InvalidData(
                    "Credit score must be between 0 and 1000".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Input model for updating an existing customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub credit_score: Option<i32>,
}

impl CustomerUpdate {
    /// Validates the customer update data
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(CustomerError::InvalidData(
                    "Full name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(income) = self.monthly_income {
            if income < Decimal::ZERO {
                return Err(CustomerError::InvalidData(
                    "Monthly income cannot be negative".to_string(),
                ));
            }
        }
        if let Some(score) = self.credit_score {
            if !(0..=1000).contains(&score) {
                return Err(CustomerError::InvalidData(
                    "Credit score must be between 0 and 1000".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Database model for customers
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
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CustomerDB {
    pub id: String,
    pub dni: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<String>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub credit_score: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<CustomerDB> for Customer {
    fn from(db: CustomerDB) -> Self {
        Self {
            id: db.id,
            dni: db.dni,
            full_name: db.full_name,
            phone: db.phone,
            email: db.email,
            password_hash: db.password_hash,
            address: db.address,
            monthly_income: db
                .monthly_income
                .and_then(|v| Decimal::from_str(&v).ok()),
            employment_status: db.employment_status,
            employer_name: db.employer_name,
            credit_score: db.credit_score,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewCustomer> for CustomerDB {
    fn from(domain: NewCustomer) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: String::new(), // Filled by the repository
            dni: domain.dni.trim().to_string(),
            full_name: domain.full_name,
            phone: domain.phone,
            email: domain.email,
            password_hash: None,
            address: domain.address,
            monthly_income: domain.monthly_income.map(|v| v.to_string()),
            employment_status: domain.employment_status,
            employer_name: domain.employer_name,
            credit_score: domain.credit_score,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
