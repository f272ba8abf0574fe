use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::loans::{LoanError, Result};
use crate::schema::{installments, loans};
use crate::utils::money_utils::round_money;

use super::loans_model::{Installment, InstallmentDB, Loan, LoanDB, LoanWithSchedule};

/// Repository for managing loan and installment data in the database
pub struct LoanRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LoanRepository {
    /// Creates a new LoanRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Persists a disbursed loan together with its full schedule as one unit
    pub fn create_with_schedule(
        &self,
        loan_db: LoanDB,
        schedule: Vec<InstallmentDB>,
    ) -> Result<LoanWithSchedule> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        conn.transaction::<_, LoanError, _>(|conn| {
            diesel::insert_into(loans::table)
                .values(&loan_db)
                .execute(conn)
                .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

            diesel::insert_into(installments::table)
                .values(&schedule)
                .execute(conn)
                .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

            Ok(LoanWithSchedule {
                loan: loan_db.into(),
                payment_schedule: schedule.into_iter().map(Installment::from).collect(),
            })
        })
    }

    /// Persists a pending loan request (no schedule yet)
    pub fn create_pending(&self, loan_db: LoanDB) -> Result<Loan> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        diesel::insert_into(loans::table)
            .values(&loan_db)
            .execute(&mut conn)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        Ok(loan_db.into())
    }

    /// Retrieves a loan by its ID
    pub fn get_by_id(&self, loan_id: &str) -> Result<Loan> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;
        Self::get_by_id_in_transaction(&mut conn, loan_id)
    }

    /// Retrieves a loan by its ID using an existing connection
    pub fn get_by_id_in_transaction(
        conn: &mut SqliteConnection,
        loan_id: &str,
    ) -> Result<Loan> {
        let loan = loans::table
            .find(loan_id)
            .first::<LoanDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    LoanError::NotFound(format!("Loan with id {} not found", loan_id))
                }
                _ => LoanError::DatabaseError(e.to_string()),
            })?;

        Ok(loan.into())
    }

    /// Lists loans, optionally filtered by status or customer
    pub fn list(
        &self,
        status_filter: Option<&str>,
        customer_filter: Option<&str>,
    ) -> Result<Vec<Loan>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        let mut query = loans::table.into_boxed();

        if let Some(loan_status) = status_filter {
            query = query.filter(loans::status.eq(loan_status.to_string()));
        }

        if let Some(customer) = customer_filter {
            query = query.filter(loans::customer_id.eq(customer.to_string()));
        }

        query
            .order(loans::created_at.desc())
            .load::<LoanDB>(&mut conn)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Loan::from).collect())
    }

    /// Loads the ordered schedule for a loan
    pub fn installments_for_loan(&self, loan_id: &str) -> Result<Vec<Installment>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;
        Self::installments_for_loan_in_transaction(&mut conn, loan_id)
    }

    /// Loads the ordered schedule for a loan using an existing connection
    pub fn installments_for_loan_in_transaction(
        conn: &mut SqliteConnection,
        loan_id: &str,
    ) -> Result<Vec<Installment>> {
        installments::table
            .filter(installments::loan_id.eq(loan_id))
            .order(installments::installment_number.asc())
            .load::<InstallmentDB>(conn)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Installment::from).collect())
    }

    /// Writes back a mutated installment within the enclosing transaction
    pub fn update_installment_in_transaction(
        conn: &mut SqliteConnection,
        installment: Installment,
    ) -> Result<()> {
        let mut installment_db: InstallmentDB = installment.into();
        installment_db.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(installments::table.find(&installment_db.id))
            .set(&installment_db)
            .execute(conn)
            .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Updates the loan aggregates within the enclosing transaction.
    ///
    /// The update is guarded by the loan's version counter; zero affected
    /// rows means another writer got there first and the transaction must
    /// abort.
    pub fn update_aggregates_in_transaction(
        conn: &mut SqliteConnection,
        loan_id: &str,
        expected_version: i32,
        paid_amount: Decimal,
        outstanding_balance: Decimal,
    ) -> Result<()> {
        let affected = diesel::update(
            loans::table
                .find(loan_id)
                .filter(loans::version.eq(expected_version)),
        )
        .set((
            loans::paid_amount.eq(round_money(paid_amount).to_string()),
            loans::outstanding_balance.eq(Some(round_money(outstanding_balance).to_string())),
            loans::version.eq(expected_version + 1),
            loans::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(conn)
        .map_err(|e| LoanError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(LoanError::DatabaseError(format!(
                "Loan {} was modified concurrently (version {})",
                loan_id, expected_version
            )));
        }

        Ok(())
    }
}
