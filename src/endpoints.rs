//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page with the expense form, table and chart.
pub const DASHBOARD_VIEW: &str = "/dashboard";

/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to ask for confirmation before deleting an expense.
pub const ARM_DELETE: &str = "/api/delete-confirmation/{expense_id}";
/// The route to back out of a pending delete.
pub const CANCEL_DELETE: &str = "/api/delete-confirmation";
/// The route to download every expense as a JSON file.
pub const EXPORT: &str = "/api/export";
/// The route to upload a JSON file that replaces every expense.
pub const IMPORT: &str = "/api/import";
/// The route to toggle the dark mode preference.
pub const DARK_MODE: &str = "/api/preferences/dark-mode";

/// The expense table fragment, takes an optional `page` query parameter.
pub const EXPENSE_LIST_PARTIAL: &str = "/partials/expenses";
/// The total expenses card and category chart fragment.
pub const SUMMARY_PARTIAL: &str = "/partials/summary";
/// The scrolling exchange rate ticker fragment.
pub const CURRENCY_TICKER_PARTIAL: &str = "/partials/currency-ticker";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
