//! Endpoints for downloading every expense as JSON and replacing them with an uploaded file.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{AppendHeaders, IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use maud::html;

use crate::{
    AppState, Error,
    alert::Alert,
    expense::{
        EXPENSES_CHANGED_EVENT,
        list::{ExpenseListView, expense_list_view},
        lock_expenses,
        store::ExpenseStore,
    },
    timezone::local_today,
};

/// The state needed to export and import expenses.
#[derive(Debug, Clone)]
pub struct TransferState {
    pub expense_store: Arc<Mutex<ExpenseStore>>,
    pub expense_list: Arc<Mutex<ExpenseListView>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            expense_list: state.expense_list.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that downloads every expense as a dated JSON file.
pub async fn export_expenses_endpoint(State(state): State<TransferState>) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let store = match state.expense_store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire expense store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let export = match store.export_all(today) {
        Ok(export) => export,
        Err(error) => {
            tracing::error!("Could not export expenses: {error}");
            return error.into_response();
        }
    };

    tracing::info!("Exported {} expenses to {}", store.len(), export.file_name);

    (
        [
            (CONTENT_TYPE, "application/json".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.contents,
    )
        .into_response()
}

/// A route handler that replaces every expense with those in an uploaded JSON file.
///
/// Responds with an alert. On success the expense table is also sent to be
/// swapped in out-of-band.
pub async fn import_expenses_endpoint(
    State(state): State<TransferState>,
    mut multipart: Multipart,
) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return Error::MultipartError("No file was uploaded.".to_owned()).into_alert_response();
        }
        Err(error) => {
            tracing::error!("Could not read multipart form: {error}");
            return Error::MultipartError("Could not read the uploaded file.".to_owned())
                .into_alert_response();
        }
    };

    let json = match read_file_field(field).await {
        Ok(json) => json,
        Err(error) => return error.into_alert_response(),
    };

    let (mut store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    let count = match store.import_all(&json) {
        Ok(count) => count,
        Err(error) => return error.into_alert_response(),
    };

    tracing::info!("Imported {count} expenses");

    // The previous page and armed row may not exist in the new data.
    *view = ExpenseListView::default();

    let alert = Alert::Success {
        message: "Import completed successfully!".to_owned(),
        details: format!("Imported {count} expenses."),
    };

    (
        AppendHeaders([(HX_TRIGGER, EXPENSES_CHANGED_EVENT)]),
        html! {
            (alert.into_html())
            (expense_list_view(store.expenses(), &view, true))
        },
    )
        .into_response()
}

async fn read_file_field(field: Field<'_>) -> Result<String, Error> {
    let file_name = field.file_name().unwrap_or("<unnamed>").to_owned();

    let data = field.text().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}
