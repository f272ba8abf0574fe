use async_trait::async_trait;

use super::customers_model::{Customer, CustomerUpdate, NewCustomer};
use crate::errors::Result;

/// Trait defining the contract for Customer service operations.
#[async_trait]
pub trait CustomerServiceTrait: Send + Sync {
    async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer>;
    async fn update_customer(&self, customer_id: &str, update: CustomerUpdate)
        -> Result<Customer>;
    async fn deactivate_customer(&self, customer_id: &str) -> Result<()>;
    async fn set_customer_password(&self, customer_id: &str, hash: &str) -> Result<()>;
    fn get_customer(&self, customer_id: &str) -> Result<Customer>;
    fn get_customer_by_dni(&self, dni: &str) -> Result<Customer>;
    fn get_customer_by_email(&self, email: &str) -> Result<Customer>;
    fn list_customers(&self, is_active_filter: Option<bool>) -> Result<Vec<Customer>>;
}
