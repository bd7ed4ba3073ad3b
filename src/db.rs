//! Database initialization for the application's domain models.

use rusqlite::Connection;

use crate::{
    budget::create_budget_table, error::Error, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the application's domain models.
///
/// This function is idempotent: tables that already exist are left untouched.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;
    create_budget_table(connection)?;

    Ok(())
}
