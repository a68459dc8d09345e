//! The in-memory expense collection and its persistence.

use std::sync::Arc;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    expense::core::{Expense, ExpenseId},
    storage::{EXPENSES_KEY, KeyValueStore},
};

const EXPORT_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// All recorded expenses, newest first.
///
/// Every mutation writes the whole collection to the key-value store before
/// the in-memory copy is updated, so a failed write leaves the store exactly
/// as it was.
#[derive(Debug)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
    storage: Arc<dyn KeyValueStore>,
}

/// A JSON file of every expense, ready to be downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// The suggested file name, e.g. "expenses-2025-03-01.json".
    pub file_name: String,
    /// The pretty printed JSON array.
    pub contents: String,
}

impl ExpenseStore {
    /// Load the expenses saved in `storage`.
    ///
    /// Missing or unreadable data is not an error, the store starts empty
    /// and a warning is logged.
    pub fn initialize(storage: Arc<dyn KeyValueStore>) -> Self {
        let expenses = match storage.get(EXPENSES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Expense>>(&json) {
                Ok(expenses) => expenses,
                Err(error) => {
                    tracing::warn!("Could not parse saved expenses, starting empty: {error}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!("Could not read saved expenses, starting empty: {error}");
                Vec::new()
            }
        };

        tracing::info!("Loaded {} expenses", expenses.len());

        Self { expenses, storage }
    }

    /// The expenses in display order, newest first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// The sum of every expense amount.
    ///
    /// Amounts in different currencies are added as is, without conversion.
    pub fn total_amount(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    /// Add `expense` to the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the expenses could not be saved, in which case the
    /// store is unchanged.
    pub fn add(&mut self, expense: Expense) -> Result<(), Error> {
        let mut expenses = Vec::with_capacity(self.expenses.len() + 1);
        expenses.push(expense);
        expenses.extend(self.expenses.iter().cloned());

        self.replace(expenses)
    }

    /// Remove the expense with `id`.
    ///
    /// Returns `Ok(false)` if no expense has that ID. The collection is saved
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the expenses could not be saved, in which case the
    /// store is unchanged.
    pub fn delete(&mut self, id: &ExpenseId) -> Result<bool, Error> {
        let mut expenses = self.expenses.clone();
        expenses.retain(|expense| &expense.id != id);
        let removed = expenses.len() != self.expenses.len();

        self.replace(expenses)?;

        Ok(removed)
    }

    /// Replace every expense with those in `json`, returning how many were imported.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidImportFormat] if `json` is not an array of
    /// expenses, or an error if the expenses could not be saved. The store is
    /// unchanged in both cases.
    pub fn import_all(&mut self, json: &str) -> Result<usize, Error> {
        let expenses = parse_import(json)?;
        let count = expenses.len();

        self.replace(expenses)?;

        Ok(count)
    }

    /// Serialize every expense as an indented JSON array, named after `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expenses could not be serialized.
    pub fn export_all(&self, today: Date) -> Result<ExportFile, Error> {
        let contents = serde_json::to_string_pretty(&self.expenses)?;
        let date = today
            .format(EXPORT_DATE_FORMAT)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        Ok(ExportFile {
            file_name: format!("expenses-{date}.json"),
            contents,
        })
    }

    fn replace(&mut self, expenses: Vec<Expense>) -> Result<(), Error> {
        let json = serde_json::to_string(&expenses)?;

        self.storage.set(EXPENSES_KEY, &json).inspect_err(|error| {
            tracing::error!("Could not save expenses: {error}");
        })?;

        self.expenses = expenses;

        Ok(())
    }
}

/// Parse an imported file as a list of expenses.
///
/// Only the shape of each record is checked. Amounts and descriptions are
/// accepted as is, even if the expense form would reject them.
fn parse_import(json: &str) -> Result<Vec<Expense>, Error> {
    serde_json::from_str::<Vec<Expense>>(json).map_err(|error| {
        tracing::warn!("Rejected imported expenses: {error}");
        Error::InvalidImportFormat
    })
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::date;

    use super::{ExpenseStore, test_expenses::create_expense};
    use crate::{
        Error,
        expense::core::{Category, ExpenseId},
        storage::{
            EXPENSES_KEY, KeyValueStore,
            test_stores::{FailingStore, MemoryStore},
        },
    };

    fn empty_store() -> (ExpenseStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::default());
        let store = ExpenseStore::initialize(storage.clone());
        (store, storage)
    }

    #[test]
    fn starts_empty_without_saved_data() {
        let (store, _) = empty_store();

        assert!(store.is_empty());
    }

    #[test]
    fn starts_empty_with_corrupt_saved_data() {
        let storage = Arc::new(MemoryStore::with_value(EXPENSES_KEY, "{not json"));

        let store = ExpenseStore::initialize(storage);

        assert!(store.is_empty());
    }

    #[test]
    fn add_prepends_and_persists() {
        let (mut store, storage) = empty_store();
        let first = create_expense(10.0, Category::Food, date!(2025 - 01 - 01));
        let second = create_expense(20.0, Category::Health, date!(2025 - 01 - 02));

        store.add(first.clone()).unwrap();
        store.add(second.clone()).unwrap();

        assert_eq!(store.expenses(), &[second.clone(), first.clone()]);
        let reloaded = ExpenseStore::initialize(storage);
        assert_eq!(reloaded.expenses(), &[second, first]);
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        let mut store = ExpenseStore::initialize(Arc::new(FailingStore));
        let expense = create_expense(10.0, Category::Food, date!(2025 - 01 - 01));

        let result = store.add(expense);

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_matching_expense() {
        let (mut store, storage) = empty_store();
        let keep = create_expense(10.0, Category::Food, date!(2025 - 01 - 01));
        let remove = create_expense(20.0, Category::Food, date!(2025 - 01 - 02));
        store.add(keep.clone()).unwrap();
        store.add(remove.clone()).unwrap();

        let removed = store.delete(&remove.id).unwrap();

        assert!(removed);
        assert_eq!(store.expenses(), &[keep.clone()]);
        let reloaded = ExpenseStore::initialize(storage);
        assert_eq!(reloaded.expenses(), &[keep]);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let (mut store, storage) = empty_store();
        store
            .add(create_expense(10.0, Category::Food, date!(2025 - 01 - 01)))
            .unwrap();
        let saved_before = storage.get(EXPENSES_KEY).unwrap();

        let removed = store.delete(&ExpenseId::from("missing".to_owned())).unwrap();

        assert!(!removed);
        assert_eq!(store.len(), 1);
        assert_eq!(storage.get(EXPENSES_KEY).unwrap(), saved_before);
    }

    #[test]
    fn total_amount_sums_all_expenses() {
        let (mut store, _) = empty_store();
        store
            .add(create_expense(12.5, Category::Food, date!(2025 - 01 - 01)))
            .unwrap();
        store
            .add(create_expense(7.5, Category::Transport, date!(2025 - 01 - 01)))
            .unwrap();

        assert_eq!(store.total_amount(), 20.0);
    }

    #[test]
    fn export_then_import_restores_expenses() {
        let (mut store, _) = empty_store();
        store
            .add(create_expense(12.5, Category::Food, date!(2025 - 01 - 01)))
            .unwrap();
        store
            .add(create_expense(7.5, Category::Health, date!(2025 - 01 - 02)))
            .unwrap();
        let export = store.export_all(date!(2025 - 03 - 01)).unwrap();
        let (mut other_store, _) = empty_store();

        let count = other_store.import_all(&export.contents).unwrap();

        assert_eq!(count, 2);
        assert_eq!(other_store.expenses(), store.expenses());
    }

    #[test]
    fn export_uses_dated_file_name_and_indentation() {
        let (mut store, _) = empty_store();
        store
            .add(create_expense(1.0, Category::Other, date!(2025 - 01 - 01)))
            .unwrap();

        let export = store.export_all(date!(2025 - 03 - 01)).unwrap();

        assert_eq!(export.file_name, "expenses-2025-03-01.json");
        assert!(export.contents.starts_with("[\n  {\n    \"id\""));
    }

    #[test]
    fn import_rejects_non_array() {
        let (mut store, _) = empty_store();
        let existing = create_expense(1.0, Category::Other, date!(2025 - 01 - 01));
        store.add(existing.clone()).unwrap();

        let result = store.import_all(r#"{"expenses": []}"#);

        assert_eq!(result, Err(Error::InvalidImportFormat));
        assert_eq!(store.expenses(), &[existing]);
    }

    #[test]
    fn import_rejects_malformed_records() {
        let (mut store, _) = empty_store();

        let result = store.import_all(r#"[{"id": "a", "amount": "lots"}]"#);

        assert_eq!(result, Err(Error::InvalidImportFormat));
        assert!(store.is_empty());
    }

    #[test]
    fn import_does_not_check_amount_bounds() {
        let (mut store, _) = empty_store();
        let json = r#"[{
            "id": "a",
            "amount": 5000000,
            "category": "food",
            "description": "",
            "currency": "EUR",
            "date": "2025-01-01T00:00:00Z"
        }]"#;

        let count = store.import_all(json).unwrap();

        assert_eq!(count, 1);
        assert_eq!(store.expenses()[0].amount, 5_000_000.0);
    }

    #[test]
    fn import_empty_array_clears_store() {
        let (mut store, _) = empty_store();
        store
            .add(create_expense(1.0, Category::Other, date!(2025 - 01 - 01)))
            .unwrap();

        let count = store.import_all("[]").unwrap();

        assert_eq!(count, 0);
        assert!(store.is_empty());
    }
}
