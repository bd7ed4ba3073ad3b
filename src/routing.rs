//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    Error,
    auth::auth_guard,
    budget::{get_budget_endpoint, post_budget_endpoint},
    charts::{get_balance_chart, get_category_chart, get_daily_chart},
    endpoints,
    import::post_import,
    log_in::post_log_in,
    register_user::post_register_user,
    report::get_report,
    state::AppState,
    transaction::{get_transactions_endpoint, post_transaction_endpoint},
};

/// Return a router with all the app's routes.
///
/// Everything except log-in and registration sits behind the bearer token
/// guard.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::REGISTER, post(post_register_user));

    let protected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::TRANSACTION, post(post_transaction_endpoint))
        .route(endpoints::REPORT, get(get_report))
        .route(endpoints::BUDGET, get(get_budget_endpoint))
        .route(endpoints::BUDGET, post(post_budget_endpoint))
        .route(endpoints::IMPORT, post(post_import))
        .route(endpoints::DAILY_CHART, get(get_daily_chart))
        .route(endpoints::BALANCE_CHART, get(get_balance_chart))
        .route(endpoints::CATEGORY_CHART, get(get_category_chart))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_not_found)
        .with_state(state)
}

async fn get_not_found() -> Error {
    Error::NotFound
}
