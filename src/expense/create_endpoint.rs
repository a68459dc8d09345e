//! Defines the endpoint for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{AppendHeaders, IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HX_TRIGGER;
use maud::html;

use crate::{
    AppState,
    expense::{
        EXPENSES_CHANGED_EVENT,
        form::{ExpenseFormData, expense_form_view},
        list::{ExpenseListView, expense_list_view},
        lock_expenses,
        store::ExpenseStore,
    },
    timezone::local_today,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub expense_store: Arc<Mutex<ExpenseStore>>,
    pub expense_list: Arc<Mutex<ExpenseListView>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            expense_list: state.expense_list.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for recording a new expense.
///
/// On success responds with a cleared form, the updated expense table
/// swapped in out-of-band and an event that refreshes the summary. Invalid
/// input re-renders the form with the first error and the submitted values.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseFormData>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("Invalid timezone {}", state.local_timezone);
            return error.into_alert_response();
        }
    };

    let expense = match form.validate(today) {
        Ok(expense) => expense,
        Err(error) => {
            tracing::debug!("Rejected expense form: {error}");
            return expense_form_view(&form, today, &error.to_string()).into_response();
        }
    };

    let (mut store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    let expense_id = expense.id.clone();
    if let Err(error) = store.add(expense) {
        tracing::error!("could not create expense: {error}");
        return error.into_alert_response();
    }

    tracing::info!("Created expense {expense_id}");

    // Keep the page within range, e.g. when the first expense is added.
    let page = view.page;
    view.go_to(page, store.len());

    let form = form.reset(today);

    (
        AppendHeaders([(HX_TRIGGER, EXPENSES_CHANGED_EVENT)]),
        html! {
            (expense_form_view(&form, today, ""))
            (expense_list_view(store.expenses(), &view, true))
        },
    )
        .into_response()
}
