//! The report endpoint, which summarises the authenticated user's finances.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    aggregate::{category_summary, report_totals},
    state::AppState,
    transaction::get_transactions,
    user::UserID,
};

/// The state needed to compute the report.
#[derive(Clone)]
pub struct ReportState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The aggregate financial report for one user.
///
/// Serialised with camelCase keys to match the report consumers.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub net_balance: f64,
    /// The signed total per category: income adds, expense subtracts.
    pub category_summary: BTreeMap<String, f64>,
}

/// Handler for the aggregate financial report.
///
/// The report is computed fresh from the user's current transactions on
/// every request.
pub async fn get_report(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Report>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;
    let totals = report_totals(&transactions);

    Ok(Json(Report {
        total_income: totals.total_income,
        total_expense: totals.total_expense,
        net_balance: totals.net_balance,
        category_summary: category_summary(&transactions),
    }))
}

#[cfg(test)]
mod report_tests {
    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        state::AppState,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::UserID,
    };

    use super::get_report;

    fn test_server_with_fixture() -> TestServer {
        let conn = Connection::open_in_memory().expect("Could not open in-memory database");
        let state = AppState::new(conn, "wow what a secret").expect("Could not create app state");

        {
            let conn = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    date: date!(2024 - 01 - 01),
                    kind: TransactionKind::Income,
                    category: "Salary".to_owned(),
                    amount: 1000.0,
                    description: "Monthly salary".to_owned(),
                },
                UserID::new(1),
                &conn,
            )
            .expect("Could not create transaction");
            create_transaction(
                NewTransaction {
                    date: date!(2024 - 01 - 02),
                    kind: TransactionKind::Expense,
                    category: "Groceries".to_owned(),
                    amount: 250.50,
                    description: "Weekly shop".to_owned(),
                },
                UserID::new(1),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let app = Router::new()
            .route("/report", get(get_report))
            .layer(Extension(UserID::new(1)))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server")
    }

    #[tokio::test]
    async fn report_uses_camel_case_keys_and_signed_summary() {
        let server = test_server_with_fixture();

        let response = server.get("/report").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalIncome"], 1000.0);
        assert_eq!(body["totalExpense"], 250.50);
        assert_eq!(body["netBalance"], 749.50);
        assert_eq!(body["categorySummary"]["Salary"], 1000.0);
        assert_eq!(body["categorySummary"]["Groceries"], -250.50);
    }
}
