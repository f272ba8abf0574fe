use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::customers_model::{Customer, CustomerUpdate, NewCustomer};
use super::customers_repository::CustomerRepository;
use super::customers_traits::CustomerServiceTrait;
use crate::errors::Result;

/// Service for managing customers
pub struct CustomerService {
    repository: CustomerRepository,
}

impl CustomerService {
    /// Creates a new CustomerService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repository: CustomerRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CustomerServiceTrait for CustomerService {
    /// Creates a new customer record
    async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
        debug!("Creating customer with DNI {}", new_customer.dni);
        Ok(self.repository.create(new_customer)?)
    }

    /// Updates an existing customer
    async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> Result<Customer> {
        Ok(self.repository.update(customer_id, update)?)
    }

    /// Soft-deletes a customer
    async fn deactivate_customer(&self, customer_id: &str) -> Result<()> {
        Ok(self.repository.deactivate(customer_id)?)
    }

    /// Stores a portal password hash produced by the caller
    async fn set_customer_password(&self, customer_id: &str, hash: &str) -> Result<()> {
        Ok(self.repository.set_password_hash(customer_id, hash)?)
    }

    /// Retrieves a customer by its ID
    fn get_customer(&self, customer_id: &str) -> Result<Customer> {
        Ok(self.repository.get_by_id(customer_id)?)
    }

    /// Retrieves a customer by national id
    fn get_customer_by_dni(&self, dni: &str) -> Result<Customer> {
        Ok(self.repository.get_by_dni(dni)?)
    }

    /// Retrieves a customer by portal email
    fn get_customer_by_email(&self, email: &str) -> Result<Customer> {
        Ok(self.repository.get_by_email(email)?)
    }

    /// Lists customers with optional filtering by active status
    fn list_customers(&self, is_active_filter: Option<bool>) -> Result<Vec<Customer>> {
        Ok(self.repository.list(is_active_filter)?)
    }
}
