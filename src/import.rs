//! Imports transactions from an uploaded CSV file.
//!
//! Rows that cannot be parsed are skipped and reported back to the client
//! with their line number, so one bad row never poisons the whole import and
//! non-finite amounts never reach the aggregates.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Multipart, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    state::AppState,
    transaction::{NewTransaction, TransactionKind, iso_date, replace_transactions},
    user::UserID,
};

/// The header row every import file must start with, in this exact order and
/// capitalisation.
const EXPECTED_HEADERS: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];

/// A row that could not be parsed, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// The one-based line number in the uploaded file. The header is line 1,
    /// so the first data row is line 2.
    pub line: usize,
    /// A human-readable description of what was wrong with the row.
    pub reason: String,
}

/// The result of parsing a CSV file: the rows that parsed and the ones that
/// did not.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// The successfully parsed transactions, in file order.
    pub transactions: Vec<NewTransaction>,
    /// One entry per skipped row.
    pub errors: Vec<RowError>,
}

/// Strip currency decoration (symbols, thousands separators) from an amount
/// field, keeping only digits, the decimal point, and a sign.
fn clean_amount(raw: &str) -> String {
    raw.chars()
        .filter(|&character| character.is_ascii_digit() || character == '.' || character == '-')
        .collect()
}

fn parse_row(record: &csv::StringRecord) -> Result<NewTransaction, String> {
    let date_field = record.get(0).unwrap_or_default();
    let date = Date::parse(date_field, iso_date::FORMAT)
        .map_err(|_| format!("'{date_field}' is not a valid date, want YYYY-MM-DD"))?;

    let kind_field = record.get(1).unwrap_or_default();
    let kind = TransactionKind::from_str(kind_field)
        .ok_or_else(|| format!("'{kind_field}' is not a valid type, want income or expense"))?;

    let amount_field = record.get(3).unwrap_or_default();
    let amount: f64 = clean_amount(amount_field)
        .parse()
        .map_err(|_| format!("'{amount_field}' is not a valid amount"))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(format!(
            "'{amount_field}' is not a valid amount, want a non-negative number"
        ));
    }

    Ok(NewTransaction {
        date,
        kind,
        category: record.get(2).unwrap_or_default().to_owned(),
        amount,
        description: record.get(4).unwrap_or_default().to_owned(),
    })
}

/// Parse the text of a CSV file into transactions.
///
/// Rows that fail to parse are skipped and reported in the outcome's
/// `errors`; the rest of the file is still imported.
///
/// # Errors
/// Returns [Error::InvalidCSV] if the header row is missing or does not
/// exactly match `Date,Type,Category,Amount,Description`.
pub fn parse_transactions_csv(text: &str) -> Result<ImportOutcome, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?
        .clone();

    if headers.iter().ne(EXPECTED_HEADERS) {
        return Err(Error::InvalidCSV(format!(
            "expected header '{}', got '{}'",
            EXPECTED_HEADERS.join(","),
            headers.iter().collect::<Vec<_>>().join(","),
        )));
    }

    let mut transactions = Vec::new();
    let mut errors = Vec::new();

    // The header is line 1, so data rows start at line 2.
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;

        let record = match record {
            Ok(record) => record,
            Err(error) => {
                errors.push(RowError {
                    line,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        match parse_row(&record) {
            Ok(transaction) => transactions.push(transaction),
            Err(reason) => errors.push(RowError { line, reason }),
        }
    }

    Ok(ImportOutcome {
        transactions,
        errors,
    })
}

/// The state needed to import transactions.
#[derive(Clone)]
pub struct ImportState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a completed import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// How many rows were imported.
    pub imported: usize,
    /// How many rows were skipped.
    pub skipped: usize,
    /// One entry per skipped row.
    pub errors: Vec<RowError>,
}

/// Handler for importing a CSV file of transactions.
///
/// The parsed rows replace the authenticated user's whole working set in one
/// SQL transaction.
///
/// # Errors
/// Responds with 400 Bad Request if the form does not contain a CSV file or
/// the file's header row is wrong.
pub async fn post_import(
    State(state): State<ImportState>,
    Extension(user_id): Extension<UserID>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, Error> {
    let field = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
        .ok_or(Error::NotCSV)?;

    let is_csv = field
        .file_name()
        .is_some_and(|file_name| file_name.to_lowercase().ends_with(".csv"));

    if !is_csv {
        return Err(Error::NotCSV);
    }

    let text = field
        .text()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?;

    let outcome = parse_transactions_csv(&text)?;

    let mut connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let imported = replace_transactions(outcome.transactions, user_id, &mut connection)?;

    Ok(Json(ImportResponse {
        imported,
        skipped: outcome.errors.len(),
        errors: outcome.errors,
    }))
}


#[cfg(test)]
mod post_import_tests {
    use axum::{
        Extension,
        extract::{FromRequest, Multipart, Request, State},
    };
    use rusqlite::Connection;

    use crate::{Error, state::AppState, transaction::get_transactions, user::UserID};

    use super::{ImportState, post_import};

    fn test_state() -> ImportState {
        let conn = Connection::open_in_memory().expect("Could not open in-memory database");
        let state = AppState::new(conn, "wow what a secret").expect("Could not create app state");

        ImportState {
            db_connection: state.db_connection,
        }
    }

    async fn must_make_multipart_csv(file_name: &str, csv_string: &str) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";

        let body = format!(
            "--{boundary}\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
            Content-Type: text/csv\r\n\
            \r\n\
            {csv_string}\r\n\
            --{boundary}--\r\n"
        );

        let request = Request::builder()
            .method("POST")
            .uri("/import")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(body.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    #[tokio::test]
    async fn import_reports_imported_and_skipped_counts() {
        let state = test_state();
        let csv = "Date,Type,Category,Amount,Description\n\
            2024-01-01,income,Salary,\"₹1,000.00\",Monthly salary\n\
            not-a-date,expense,Groceries,250.50,Weekly shop";

        let axum::Json(response) = post_import(
            State(state.clone()),
            Extension(UserID::new(1)),
            must_make_multipart_csv("transactions.csv", csv).await,
        )
        .await
        .expect("Import should succeed");

        assert_eq!(response.imported, 1);
        assert_eq!(response.skipped, 1);
        assert_eq!(response.errors[0].line, 3);

        let connection = state.db_connection.lock().unwrap();
        let transactions =
            get_transactions(UserID::new(1), &connection).expect("Could not retrieve transactions");
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 1000.0);
    }

    #[tokio::test]
    async fn import_replaces_previous_working_set() {
        let state = test_state();

        let first = "Date,Type,Category,Amount,Description\n\
            2024-01-01,income,Salary,1000,Monthly salary";
        post_import(
            State(state.clone()),
            Extension(UserID::new(1)),
            must_make_multipart_csv("transactions.csv", first).await,
        )
        .await
        .expect("First import should succeed");

        let second = "Date,Type,Category,Amount,Description\n\
            2024-01-02,expense,Groceries,250.50,Weekly shop";
        post_import(
            State(state.clone()),
            Extension(UserID::new(1)),
            must_make_multipart_csv("transactions.csv", second).await,
        )
        .await
        .expect("Second import should succeed");

        let connection = state.db_connection.lock().unwrap();
        let transactions =
            get_transactions(UserID::new(1), &connection).expect("Could not retrieve transactions");
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Groceries");
    }

    #[tokio::test]
    async fn import_rejects_non_csv_file() {
        let result = post_import(
            State(test_state()),
            Extension(UserID::new(1)),
            must_make_multipart_csv("transactions.txt", "hello").await,
        )
        .await;

        assert!(matches!(result, Err(Error::NotCSV)));
    }

    #[tokio::test]
    async fn import_rejects_wrong_header() {
        let result = post_import(
            State(test_state()),
            Extension(UserID::new(1)),
            must_make_multipart_csv("transactions.csv", "a,b,c\n1,2,3").await,
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCSV(_))));
    }
}
