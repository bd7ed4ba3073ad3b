//! Chart generation for the dashboard.
//!
//! Each endpoint reshapes the aggregate views into an ECharts configuration
//! and responds with the option JSON; the client owns the rendering. The
//! charts stick to plain data and labels so the serialised options stay
//! valid JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header,
    response::IntoResponse,
};
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger},
    series::{Bar, Line, Pie},
};
use rusqlite::Connection;

use crate::{
    Error,
    aggregate::{daily_totals, expense_totals_by_category, running_balance},
    state::AppState,
    transaction::{Transaction, get_transactions, iso_date},
    user::UserID,
};

/// The state needed to build the dashboard charts.
#[derive(Clone)]
pub struct ChartsState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChartsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn date_label(date: time::Date) -> String {
    // The format only fails for formats with unavailable components, which
    // cannot happen for year-month-day.
    date.format(iso_date::FORMAT).unwrap_or_default()
}

/// A bar chart of income vs. expense totals per day.
pub fn daily_chart(transactions: &[Transaction]) -> Chart {
    let totals = daily_totals(transactions);

    let labels: Vec<_> = totals.iter().map(|total| date_label(total.date)).collect();
    let income: Vec<_> = totals.iter().map(|total| total.income).collect();
    let expense: Vec<_> = totals.iter().map(|total| total.expense).collect();

    Chart::new()
        .title(Title::new().text("Income vs. Expenses").subtext("Per day"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expense),
        )
}

/// A line chart of the running balance, one point per transaction.
pub fn balance_chart(transactions: &[Transaction]) -> Chart {
    let balance = running_balance(transactions);

    let labels: Vec<_> = balance.iter().map(|point| date_label(point.date)).collect();
    let values: Vec<_> = balance.iter().map(|point| point.balance).collect();

    Chart::new()
        .title(Title::new().text("Balance").subtext("After each transaction"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Line::new().name("Balance").data(values))
}

/// A donut chart of expense totals per category.
pub fn category_chart(transactions: &[Transaction]) -> Chart {
    let totals = expense_totals_by_category(transactions);

    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|total| (total.total, total.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Expenses").radius(vec!["40%", "70%"]).data(data))
}

fn chart_response(chart: Chart) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        chart.to_string(),
    )
}

fn user_transactions(state: &ChartsState, user_id: UserID) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(user_id, &connection)
}

/// Handler for the daily income vs. expense chart.
pub async fn get_daily_chart(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let transactions = user_transactions(&state, user_id)?;

    Ok(chart_response(daily_chart(&transactions)))
}

/// Handler for the running balance chart.
pub async fn get_balance_chart(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let transactions = user_transactions(&state, user_id)?;

    Ok(chart_response(balance_chart(&transactions)))
}

/// Handler for the expense category chart.
pub async fn get_category_chart(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<impl IntoResponse, Error> {
    let transactions = user_transactions(&state, user_id)?;

    Ok(chart_response(category_chart(&transactions)))
}
