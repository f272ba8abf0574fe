use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::customers::{CustomerError, Result};
use crate::db::get_connection;
use crate::schema::customers;
use crate::schema::customers::dsl::*;

use super::customers_model::{Customer, CustomerDB, CustomerUpdate, NewCustomer};

/// Repository for managing customer data in the database
pub struct CustomerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new customer in the database
    pub fn create(&self, new_customer: NewCustomer) -> Result<Customer> {
        new_customer.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let existing = customers
            .filter(dni.eq(new_customer.dni.trim()))
            .first::<CustomerDB>(&mut conn)
            .optional()
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;
        if existing.is_some() {
            return Err(CustomerError::AlreadyExists(format!(
                "Customer with DNI {} already exists",
                new_customer.dni.trim()
            )));
        }

        let mut customer_db: CustomerDB = new_customer.into();
        customer_db.id = uuid::Uuid::new_v4().to_string();

        diesel::insert_into(customers::table)
            .values(&customer_db)
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        Ok(customer_db.into())
    }

    /// Updates an existing customer, leaving unset fields untouched
    pub fn update(&self, customer_id: &str, update: CustomerUpdate) -> Result<Customer> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let mut existing = customers
            .find(customer_id)
            .first::<CustomerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomerError::NotFound(format!(
                    "Customer with id {} not found",
                    customer_id
                )),
                _ => CustomerError::DatabaseError(e.to_string()),
            })?;

        if let Some(name) = update.full_name {
            existing.full_name = name;
        }
        if update.phone.is_some() {
            existing.phone = update.phone;
        }
        if update.email.is_some() {
            existing.email = update.email;
        }
        if update.address.is_some() {
            existing.address = update.address;
        }
        if let Some(income) = update.monthly_income {
            existing.monthly_income = Some(income.to_string());
        }
        if update.employment_status.is_some() {
            existing.employment_status = update.employment_status;
        }
        if update.employer_name.is_some() {
            existing.employer_name = update.employer_name;
        }
        if update.credit_score.is_some() {
            existing.credit_score = update.credit_score;
        }
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(customers.find(customer_id))
            .set(&existing)
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        Ok(existing.into())
    }

    /// Retrieves a customer by its ID
    pub fn get_by_id(&self, customer_id: &str) -> Result<Customer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let customer = customers
            .find(customer_id)
            .first::<CustomerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomerError::NotFound(format!(
                    "Customer with id {} not found",
                    customer_id
                )),
                _ => CustomerError::DatabaseError(e.to_string()),
            })?;

        Ok(customer.into())
    }

    /// Retrieves a customer by national id
    pub fn get_by_dni(&self, customer_dni: &str) -> Result<Customer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let customer = customers
            .filter(dni.eq(customer_dni))
            .first::<CustomerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomerError::NotFound(format!(
                    "Customer with DNI {} not found",
                    customer_dni
                )),
                _ => CustomerError::DatabaseError(e.to_string()),
            })?;

        Ok(customer.into())
    }

    /// Retrieves a customer by portal email
    pub fn get_by_email(&self, customer_email: &str) -> Result<Customer> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let customer = customers
            .filter(email.eq(customer_email))
            .first::<CustomerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => CustomerError::NotFound(format!(
                    "Customer with email {} not found",
                    customer_email
                )),
                _ => CustomerError::DatabaseError(e.to_string()),
            })?;

        Ok(customer.into())
    }

    /// Lists customers, optionally filtering by active status
    pub fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Customer>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let mut query = customers::table.into_boxed();

        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        query
            .order(full_name.asc())
            .load::<CustomerDB>(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Customer::from).collect())
    }

    /// Soft-deletes a customer by flagging it inactive
    pub fn deactivate(&self, customer_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(customers.find(customer_id))
            .set((
                is_active.eq(false),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CustomerError::NotFound(format!(
                "Customer with id {} not found",
                customer_id
            )));
        }

        Ok(())
    }

    /// Stores the portal password hash for a customer
    pub fn set_password_hash(&self, customer_id: &str, hash: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(customers.find(customer_id))
            .set((
                password_hash.eq(Some(hash.to_string())),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| CustomerError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CustomerError::NotFound(format!(
                "Customer with id {} not found",
                customer_id
            )));
        }

        Ok(())
    }
}
