//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    currency::get_currency_ticker_partial,
    dashboard::{get_dashboard_page, get_summary_partial, toggle_dark_mode_endpoint},
    endpoints,
    expense::{
        arm_delete_endpoint, cancel_delete_endpoint, create_expense_endpoint,
        delete_expense_endpoint, export_expenses_endpoint, get_expense_list_partial,
        import_expenses_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page));

    let partials = Router::new()
        .route(endpoints::EXPENSE_LIST_PARTIAL, get(get_expense_list_partial))
        .route(endpoints::SUMMARY_PARTIAL, get(get_summary_partial))
        .route(
            endpoints::CURRENCY_TICKER_PARTIAL,
            get(get_currency_ticker_partial),
        );

    let api = Router::new()
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route(endpoints::EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::ARM_DELETE, post(arm_delete_endpoint))
        .route(endpoints::CANCEL_DELETE, delete(cancel_delete_endpoint))
        .route(endpoints::EXPORT, get(export_expenses_endpoint))
        .route(endpoints::IMPORT, post(import_expenses_endpoint))
        .route(endpoints::DARK_MODE, post(toggle_dark_mode_endpoint));

    pages
        .merge(partials)
        .merge(api)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
