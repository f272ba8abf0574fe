use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::payments::{PaymentError, Result};
use crate::schema::payments;

use super::payments_model::{Payment, PaymentDB, PaymentStatus};

/// Repository for managing payment records in the database
pub struct PaymentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Inserts a payment record within the enclosing transaction
    pub fn create_in_transaction(
        conn: &mut SqliteConnection,
        payment_db: &PaymentDB,
    ) -> Result<()> {
        diesel::insert_into(payments::table)
            .values(payment_db)
            .execute(conn)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Retrieves a payment by its ID
    pub fn get_by_id(&self, payment_id: &str) -> Result<Payment> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;
        Self::get_by_id_in_transaction(&mut conn, payment_id)
    }

    /// Retrieves a payment by its ID using an existing connection
    pub fn get_by_id_in_transaction(
        conn: &mut SqliteConnection,
        payment_id: &str,
    ) -> Result<Payment> {
        let payment = payments::table
            .find(payment_id)
            .first::<PaymentDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PaymentError::NotFound(format!(
                    "Payment with id {} not found",
                    payment_id
                )),
                _ => PaymentError::DatabaseError(e.to_string()),
            })?;

        Ok(payment.into())
    }

    /// Lists the payment history of a loan, newest first
    pub fn list_by_loan(&self, loan_id: &str) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        payments::table
            .filter(payments::loan_id.eq(loan_id))
            .order(payments::created_at.desc())
            .load::<PaymentDB>(&mut conn)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Payment::from).collect())
    }

    /// Lists payments awaiting approval
    pub fn list_pending(&self) -> Result<Vec<Payment>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        payments::table
            .filter(payments::status.eq(PaymentStatus::Pending.as_str()))
            .order(payments::created_at.asc())
            .load::<PaymentDB>(&mut conn)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Payment::from).collect())
    }

    /// Flips a pending payment to approved within the enclosing
    /// transaction, recording the settled split for targeted payments.
    ///
    /// Guarded by the current status so a payment can be processed at
    /// most once; zero affected rows means it was no longer pending.
    pub fn approve_in_transaction(
        conn: &mut SqliteConnection,
        payment_id: &str,
        principal_paid: Option<Decimal>,
        interest_paid: Option<Decimal>,
    ) -> Result<()> {
        let affected = diesel::update(
            payments::table
                .find(payment_id)
                .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
        )
        .set((
            payments::status.eq(PaymentStatus::Approved.as_str()),
            payments::principal_paid.eq(principal_paid.map(|v| v.to_string())),
            payments::interest_paid.eq(interest_paid.map(|v| v.to_string())),
        ))
        .execute(conn)
        .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(PaymentError::AlreadyProcessed);
        }

        Ok(())
    }

    /// Flips a pending payment to rejected. Guarded the same way as
    /// approval.
    pub fn mark_rejected(&self, payment_id: &str) -> Result<Payment> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(
            payments::table
                .find(payment_id)
                .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
        )
        .set(payments::status.eq(PaymentStatus::Rejected.as_str()))
        .execute(&mut conn)
        .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            // Distinguish a missing payment from a processed one
            Self::get_by_id_in_transaction(&mut conn, payment_id)?;
            return Err(PaymentError::AlreadyProcessed);
        }

        Self::get_by_id_in_transaction(&mut conn, payment_id)
    }
}
