//! The endpoints for the REST API.

/// The endpoint for logging in with a username and password.
pub const LOG_IN: &str = "/api/login";

/// The endpoint for registering a new user account.
pub const REGISTER: &str = "/api/register";

/// The endpoint for listing (optionally filtered) transactions.
pub const TRANSACTIONS: &str = "/transactions";

/// The endpoint for creating a single transaction.
pub const TRANSACTION: &str = "/transaction";

/// The endpoint for the aggregate financial report.
pub const REPORT: &str = "/report";

/// The endpoint for reading and setting per-category budgets.
pub const BUDGET: &str = "/budget";

/// The endpoint for importing transactions from a CSV file.
pub const IMPORT: &str = "/import";

/// The endpoint for the daily income vs. expense chart.
pub const DAILY_CHART: &str = "/charts/daily";

/// The endpoint for the running balance chart.
pub const BALANCE_CHART: &str = "/charts/balance";

/// The endpoint for the expense category chart.
pub const CATEGORY_CHART: &str = "/charts/categories";
