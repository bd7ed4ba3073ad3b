//! Pocketify is a web service for tracking personal income and spending.
//!
//! This library provides a JSON REST API for recording transactions, setting
//! per-category budgets, importing transactions from CSV files, and computing
//! the aggregate reports and chart data that back the dashboard views.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod aggregate;
mod auth;
mod budget;
mod charts;
mod db;
mod endpoints;
mod error;
mod filter;
mod import;
mod log_in;
mod password;
mod register_user;
mod report;
mod routing;
mod state;
mod transaction;
mod user;

pub use aggregate::{
    BalancePoint, CategoryTotal, DailyTotal, ReportTotals, category_summary, daily_totals,
    expense_totals_by_category, report_totals, running_balance, top_expense_category,
};
pub use charts::{balance_chart, category_chart, daily_chart};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use filter::{TransactionFilter, category_options, filter_transactions, matches_filter};
pub use import::{ImportOutcome, RowError, parse_transactions_csv};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use state::AppState;
pub use transaction::{CATEGORIES, NewTransaction, Transaction, TransactionKind};
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
