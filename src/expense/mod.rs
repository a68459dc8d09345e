//! Recording, listing, deleting, importing and exporting expenses.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod list;
mod store;
mod transfer;

use std::sync::{Mutex, MutexGuard};

pub use core::{Category, Currency, Expense, ExpenseId};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use form::{ExpenseFormData, expense_form_view};
pub use list::{
    ExpenseListView, arm_delete_endpoint, cancel_delete_endpoint, expense_list_view,
    get_expense_list_partial,
};
pub use store::ExpenseStore;
pub use transfer::{export_expenses_endpoint, import_expenses_endpoint};

#[cfg(test)]
pub(crate) use store::test_expenses;

use crate::Error;

/// The htmx event sent with a response that changed the expenses, so that
/// the summary card and chart refresh.
pub const EXPENSES_CHANGED_EVENT: &str = "expenses-changed";

/// Lock the expense store and then the table view.
///
/// Always take both locks through this function so they are acquired in
/// the same order.
pub(crate) fn lock_expenses<'a>(
    store: &'a Mutex<ExpenseStore>,
    view: &'a Mutex<ExpenseListView>,
) -> Result<(MutexGuard<'a, ExpenseStore>, MutexGuard<'a, ExpenseListView>), Error> {
    let store = store.lock().map_err(|error| {
        tracing::error!("could not acquire expense store lock: {error}");
        Error::StoreLockError
    })?;

    let view = view.lock().map_err(|error| {
        tracing::error!("could not acquire expense list lock: {error}");
        Error::StoreLockError
    })?;

    Ok((store, view))
}
