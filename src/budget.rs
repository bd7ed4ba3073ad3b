//! Per-category spending limits and their endpoint handlers.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{Error, state::AppState, user::UserID};

/// Create the budget table in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            category TEXT NOT NULL,
            \"limit\" REAL NOT NULL,
            UNIQUE(user_id, category)
        )",
        (),
    )?;

    Ok(())
}

/// Set `user_id`'s spending limit for `category`, replacing any existing
/// limit for that category.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the limit is not finite and
/// non-negative, or [Error::SqlError] if there was an unexpected SQL error.
pub fn set_budget(
    category: &str,
    limit: f64,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(Error::InvalidAmount(limit.to_string()));
    }

    connection.execute(
        "INSERT INTO budget (user_id, category, \"limit\") VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, category) DO UPDATE SET \"limit\" = excluded.\"limit\"",
        (user_id.as_i64(), category, limit),
    )?;

    Ok(())
}

/// Retrieve all of `user_id`'s budgets as a category to limit map.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error.
pub fn get_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<BTreeMap<String, f64>, Error> {
    connection
        .prepare("SELECT category, \"limit\" FROM budget WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// The state needed to read and set budgets.
#[derive(Clone)]
pub struct BudgetState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The category and limit submitted by the client.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The category the limit applies to.
    pub category: String,
    /// The spending limit, must be finite and non-negative.
    pub limit: f64,
}

/// Handler for reading the authenticated user's budgets.
pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<BTreeMap<String, f64>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(get_budgets(user_id, &connection)?))
}

/// Handler for setting one of the authenticated user's budgets.
///
/// Responds with the updated category to limit map.
///
/// # Errors
/// Responds with 400 Bad Request if the limit is not finite and
/// non-negative.
pub async fn post_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<BudgetForm>,
) -> Result<Json<BTreeMap<String, f64>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    set_budget(&form.category, form.limit, user_id, &connection)?;

    Ok(Json(get_budgets(user_id, &connection)?))
}

#[cfg(test)]
mod budget_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, user::UserID};

    use super::{get_budgets, set_budget};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().expect("Could not open in-memory database");
        initialize(&conn).expect("Could not initialize database");
        conn
    }

    #[test]
    fn set_budget_inserts_new_category() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);

        set_budget("Groceries", 300.0, user_id, &conn).expect("Could not set budget");

        let budgets = get_budgets(user_id, &conn).expect("Could not retrieve budgets");
        assert_eq!(budgets["Groceries"], 300.0);
    }

    #[test]
    fn set_budget_replaces_existing_limit() {
        let conn = get_test_connection();
        let user_id = UserID::new(1);
        set_budget("Groceries", 300.0, user_id, &conn).expect("Could not set budget");

        set_budget("Groceries", 350.0, user_id, &conn).expect("Could not update budget");

        let budgets = get_budgets(user_id, &conn).expect("Could not retrieve budgets");
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets["Groceries"], 350.0);
    }

    #[test]
    fn set_budget_rejects_negative_limit() {
        let conn = get_test_connection();

        let result = set_budget("Groceries", -1.0, UserID::new(1), &conn);

        assert_eq!(result, Err(Error::InvalidAmount("-1".to_owned())));
    }

    #[test]
    fn budgets_are_scoped_to_their_user() {
        let conn = get_test_connection();
        set_budget("Groceries", 300.0, UserID::new(1), &conn).expect("Could not set budget");

        let budgets = get_budgets(UserID::new(2), &conn).expect("Could not retrieve budgets");

        assert!(budgets.is_empty());
    }
}
