//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::{
    currency::CurrencyFeed,
    expense::{ExpenseListView, ExpenseStore},
    storage::KeyValueStore,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key-value store that expenses and preferences are saved in.
    pub storage: Arc<dyn KeyValueStore>,

    /// Every recorded expense.
    pub expense_store: Arc<Mutex<ExpenseStore>>,

    /// The page and pending delete of the expense table.
    pub expense_list: Arc<Mutex<ExpenseListView>>,

    /// The latest exchange rates.
    pub currency_feed: CurrencyFeed,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState], loading any expenses saved in `storage`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    /// The caller is responsible for starting `currency_feed`.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        currency_feed: CurrencyFeed,
        local_timezone: &str,
    ) -> Self {
        let expense_store = ExpenseStore::initialize(storage.clone());

        Self {
            storage,
            expense_store: Arc::new(Mutex::new(expense_store)),
            expense_list: Arc::new(Mutex::new(ExpenseListView::default())),
            currency_feed,
            local_timezone: local_timezone.to_owned(),
        }
    }
}
