//! The transaction model, its database queries, and its endpoint handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    filter::{TransactionFilter, filter_transactions},
    state::AppState,
    user::UserID,
};

/// The categories suggested to the client when recording a transaction.
///
/// Any string is accepted as a category; this list only backs the
/// suggestion dropdown.
pub const CATEGORIES: [&str; 15] = [
    "Groceries",
    "Entertainment",
    "Utilities",
    "Rent/Mortgage",
    "Transportation",
    "Dining Out",
    "Healthcare",
    "Education",
    "Shopping",
    "Salary",
    "Freelance",
    "Investments",
    "Gifts",
    "Bonus",
    "Other",
];

/// Whether a transaction adds to or subtracts from the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The lowercase string stored in the database and sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the lowercase wire/database string.
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// Serde helpers for (de)serialising [time::Date] as `YYYY-MM-DD`.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    /// The `YYYY-MM-DD` date format used on the wire and in the database.
    pub const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = date.format(FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Date::parse(&raw, FORMAT).map_err(D::Error::custom)
    }

    /// Like the parent module, but for optional dates in query strings where
    /// an absent or empty parameter means "no bound".
    pub mod option {
        use serde::{Deserialize, Deserializer, de::Error as _};
        use time::Date;

        use super::FORMAT;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;

            match raw.as_deref() {
                None | Some("") => Ok(None),
                Some(raw) => Date::parse(raw, FORMAT).map(Some).map_err(D::Error::custom),
            }
        }
    }
}

/// A single income or expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The database ID of the transaction.
    pub id: i64,
    /// The day the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: String,
    /// The amount of money, always non-negative.
    pub amount: f64,
    /// A free-form note describing the transaction.
    pub description: String,
}

/// A transaction submitted by the client, before it is given an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The day the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: String,
    /// The amount of money, must be finite and non-negative.
    pub amount: f64,
    /// A free-form note describing the transaction.
    pub description: String,
}

impl NewTransaction {
    /// Check that the amount is a finite, non-negative number.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] otherwise.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidAmount(self.amount.to_string()));
        }

        Ok(())
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            date TEXT NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert a validated transaction for `user_id` into the database.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the amount is not finite and
/// non-negative, or [Error::SqlError] if there was an unexpected SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    new_transaction.validate()?;

    let date_string = new_transaction
        .date
        .format(iso_date::FORMAT)
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, date, kind, category, amount, description)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            date_string,
            new_transaction.kind.as_str(),
            &new_transaction.category,
            new_transaction.amount,
            &new_transaction.description,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        date: new_transaction.date,
        kind: new_transaction.kind,
        category: new_transaction.category,
        amount: new_transaction.amount,
        description: new_transaction.description,
    })
}

/// Retrieve all of `user_id`'s transactions, ordered by date then insertion
/// order.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, kind, category, amount, description FROM \"transaction\"
            WHERE user_id = ?1
            ORDER BY date ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace all of `user_id`'s transactions with `transactions` in a single
/// SQL transaction, so a failed import never leaves a partial working set.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error. In that
/// case the previous working set is left untouched.
pub fn replace_transactions(
    transactions: Vec<NewTransaction>,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.transaction()?;

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE user_id = ?1",
        [user_id.as_i64()],
    )?;

    let count = transactions.len();

    for new_transaction in transactions {
        new_transaction.validate()?;

        let date_string = new_transaction
            .date
            .format(iso_date::FORMAT)
            .map_err(|error| Error::InvalidCSV(error.to_string()))?;

        sql_transaction.execute(
            "INSERT INTO \"transaction\" (user_id, date, kind, category, amount, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                user_id.as_i64(),
                date_string,
                new_transaction.kind.as_str(),
                &new_transaction.category,
                new_transaction.amount,
                &new_transaction.description,
            ),
        )?;
    }

    sql_transaction.commit()?;

    Ok(count)
}

fn map_transaction_row(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    let date_string: String = row.get(1)?;
    let date = Date::parse(&date_string, iso_date::FORMAT).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let kind_string: String = row.get(2)?;
    let kind = TransactionKind::from_str(&kind_string).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("invalid transaction kind '{kind_string}'").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        date,
        kind,
        category: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
    })
}

/// The state needed to read and create transactions.
#[derive(Clone)]
pub struct TransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handler for listing the authenticated user's transactions, optionally
/// narrowed by the filter given in the query string.
///
/// # Errors
/// Responds with 500 Internal Server Error on database errors.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(transaction_filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;

    Ok(Json(filter_transactions(&transactions, &transaction_filter)))
}

/// Handler for creating a single transaction for the authenticated user.
///
/// # Errors
/// Responds with 400 Bad Request if the amount is not finite and
/// non-negative.
pub async fn post_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(new_transaction, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
