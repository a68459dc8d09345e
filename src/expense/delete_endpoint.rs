//! Defines the endpoint for deleting an expense once the user has confirmed it.

use axum::{
    extract::{Path, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;

use crate::expense::{
    EXPENSES_CHANGED_EVENT,
    core::ExpenseId,
    list::{ExpenseListState, expense_list_view},
    lock_expenses,
};

/// A route handler for deleting an expense, responds with the updated expense table.
///
/// The expense is only deleted if it is the row waiting for confirmation,
/// otherwise the table is rendered unchanged.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseListState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let (mut store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    if !view.confirmation.is_armed(&expense_id) {
        tracing::debug!("Ignoring delete for expense {expense_id} that was not confirmed");
        return expense_list_view(store.expenses(), &view, false).into_response();
    }

    match store.delete(&expense_id) {
        Ok(true) => tracing::info!("Deleted expense {expense_id}"),
        Ok(false) => tracing::warn!("Tried to delete expense {expense_id} that does not exist"),
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            return error.into_alert_response();
        }
    }

    view.confirmation.confirm(&expense_id);

    (
        AppendHeaders([(HX_TRIGGER, EXPENSES_CHANGED_EVENT)]),
        expense_list_view(store.expenses(), &view, false),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use super::delete_expense_endpoint;
    use crate::{
        expense::{
            EXPENSES_CHANGED_EVENT, ExpenseStore,
            core::Expense,
            list::{DeleteConfirmation, ExpenseListState, ExpenseListView},
            store::test_expenses::create_expenses,
        },
        storage::{
            KeyValueStore,
            test_stores::{FailingStore, MemoryStore},
        },
        test_utils::{assert_status_ok, get_header},
    };

    fn get_state(storage: Arc<dyn KeyValueStore>, expenses: &[Expense]) -> ExpenseListState {
        let json = serde_json::to_string(expenses).unwrap();
        // Writes to a failing store are expected to fail here.
        let _ = storage.set("expenses", &json);

        ExpenseListState {
            expense_store: Arc::new(Mutex::new(ExpenseStore::initialize(storage))),
            expense_list: Arc::new(Mutex::new(ExpenseListView::default())),
        }
    }

    #[tokio::test]
    async fn deletes_armed_expense() {
        let expenses = create_expenses(3);
        let state = get_state(Arc::new(MemoryStore::default()), &expenses);
        let target = expenses[1].id.clone();
        state.expense_list.lock().unwrap().confirmation.arm(target.clone());

        let response = delete_expense_endpoint(State(state.clone()), Path(target.clone()))
            .await
            .into_response();

        assert_status_ok(&response);
        assert_eq!(get_header(&response, "hx-trigger"), EXPENSES_CHANGED_EVENT);
        let store = state.expense_store.lock().unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.expenses().iter().all(|expense| expense.id != target));
        assert_eq!(
            state.expense_list.lock().unwrap().confirmation,
            DeleteConfirmation::Idle
        );
    }

    #[tokio::test]
    async fn ignores_delete_that_was_not_armed() {
        let expenses = create_expenses(3);
        let state = get_state(Arc::new(MemoryStore::default()), &expenses);
        state
            .expense_list
            .lock()
            .unwrap()
            .confirmation
            .arm(expenses[0].id.clone());

        let response = delete_expense_endpoint(State(state.clone()), Path(expenses[1].id.clone()))
            .await
            .into_response();

        assert_status_ok(&response);
        assert!(response.headers().get("hx-trigger").is_none());
        assert_eq!(state.expense_store.lock().unwrap().len(), 3);
        assert_eq!(
            state.expense_list.lock().unwrap().confirmation,
            DeleteConfirmation::Armed(expenses[0].id.clone())
        );
    }

    #[tokio::test]
    async fn failed_save_keeps_expense_and_confirmation() {
        let state = get_state(Arc::new(FailingStore), &[]);
        let expenses = create_expenses(1);
        let target = expenses[0].id.clone();
        state.expense_list.lock().unwrap().confirmation.arm(target.clone());

        let response = delete_expense_endpoint(State(state.clone()), Path(target.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            state.expense_list.lock().unwrap().confirmation,
            DeleteConfirmation::Armed(target)
        );
    }
}
