//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for the dashboard page
//! - The route handler for the summary partial that refreshes after expenses change
//! - The views for the page header and summary cards

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    AppState, Error,
    currency::{CurrencyFeed, TICKER_STYLE, ticker_view},
    dashboard::{charts::category_chart_view, preferences::load_dark_mode},
    endpoints,
    expense::{
        EXPENSES_CHANGED_EVENT, Expense, ExpenseFormData, ExpenseListView, ExpenseStore,
        expense_form_view, expense_list_view, lock_expenses,
    },
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, HeadElement, LINK_STYLE, base, format_currency},
    storage::KeyValueStore,
    timezone::local_today,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub storage: Arc<dyn KeyValueStore>,
    pub expense_store: Arc<Mutex<ExpenseStore>>,
    pub expense_list: Arc<Mutex<ExpenseListView>>,
    pub currency_feed: CurrencyFeed,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            storage: state.storage.clone(),
            expense_store: state.expense_store.clone(),
            expense_list: state.expense_list.clone(),
            currency_feed: state.currency_feed.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with the expense form, the expense table and a summary of spending.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let dark_mode = load_dark_mode(state.storage.as_ref());

    let (store, mut view) = lock_expenses(&state.expense_store, &state.expense_list)?;
    // A fresh page load starts from the first page with nothing armed.
    *view = ExpenseListView::default();

    let content = html! {
        (ticker_view(&state.currency_feed.status()))

        div class="max-w-screen-xl mx-auto px-4 py-6 text-gray-900 dark:text-white"
        {
            (header_view(dark_mode))

            div class="grid grid-cols-1 lg:grid-cols-3 gap-4"
            {
                div class="lg:col-span-2"
                {
                    section class=(CARD_STYLE)
                    {
                        h2 class="text-xl font-semibold mb-4" { "Add Expense" }
                        (expense_form_view(&ExpenseFormData::new(today), today, ""))
                    }

                    (expense_list_view(store.expenses(), &view, false))
                }

                (summary_view(store.expenses(), store.total_amount(), dark_mode))
            }
        }
    };

    Ok(base(
        "Dashboard",
        dark_mode,
        &[HeadElement::Style(PreEscaped(TICKER_STYLE.to_owned()))],
        &content,
    )
    .into_response())
}

/// A route handler for the total and chart, requested when the expenses change.
pub async fn get_summary_partial(State(state): State<DashboardState>) -> Response {
    let dark_mode = load_dark_mode(state.storage.as_ref());

    let store = match state.expense_store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire expense store lock: {error}");
            return Error::StoreLockError.into_alert_response();
        }
    };

    summary_view(store.expenses(), store.total_amount(), dark_mode).into_response()
}

fn header_view(dark_mode: bool) -> Markup {
    let toggle_label = if dark_mode { "Light Mode" } else { "Dark Mode" };

    html! {
        header class="flex flex-wrap items-center justify-between gap-4 mb-6"
        {
            h1 class="text-3xl font-bold" { "Budget Dashboard" }

            div class="flex flex-wrap items-center gap-4"
            {
                button
                    type="button"
                    hx-post=(endpoints::DARK_MODE)
                    hx-target-error="#alert-container"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    (toggle_label)
                }

                a href=(endpoints::EXPORT) download class=(LINK_STYLE) { "Export" }

                form
                    id="import-form"
                    hx-post=(endpoints::IMPORT)
                    hx-encoding="multipart/form-data"
                    hx-trigger="change"
                    hx-target="#alert-container"
                    hx-target-error="#alert-container"
                {
                    label for="import-file" class=(LINK_STYLE) { "Import" }
                    input
                        id="import-file"
                        type="file"
                        name="file"
                        accept=".json"
                        class="sr-only";
                }
            }
        }
    }
}

fn summary_view(expenses: &[Expense], total: f64, dark_mode: bool) -> Markup {
    html! {
        div
            id="summary"
            hx-get=(endpoints::SUMMARY_PARTIAL)
            hx-trigger={ (EXPENSES_CHANGED_EVENT) " from:body" }
            hx-swap="outerHTML"
        {
            section class=(CARD_STYLE)
            {
                h2 class="text-lg font-semibold text-gray-500 dark:text-gray-400" { "Total Expenses" }
                p id="total-expenses" class="text-3xl font-bold" { (format_currency(total)) }
            }

            section class=(CARD_STYLE)
            {
                (category_chart_view(expenses, dark_mode))
            }
        }
    }
}
