//! A web app for tracking personal expenses.
//!
//! Expenses are recorded through a form, listed in a paginated table and
//! broken down by category in a chart. A ticker in the page header shows
//! live exchange rates polled from a public API.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod currency;
mod dashboard;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod not_found;
mod pagination;
mod routing;
mod storage;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use currency::{CurrencyFeed, CurrencyRate, FeedHandle, FeedStatus, HttpRateSource, RateSource};
pub use currency::{RATE_POLL_PERIOD, RATES_URL};
pub use expense::{Category, Currency, Expense, ExpenseId, ExpenseStore};
pub use routing::build_router;
pub use storage::{KeyValueStore, SqliteKeyValueStore};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The amount entered in the expense form is not a finite number.
    #[error("Amount must be a number")]
    AmountNotANumber,

    /// The amount entered in the expense form is zero or negative.
    #[error("Amount must be greater than 0")]
    AmountNotPositive,

    /// The amount entered in the expense form is larger than 1,000,000.
    #[error("Amount cannot exceed 1,000,000")]
    AmountTooLarge,

    /// The category is empty or not one of the known categories.
    #[error("Select a valid category")]
    InvalidCategory(String),

    /// The description is empty or only whitespace.
    #[error("Description is required")]
    EmptyDescription,

    /// The description is longer than 100 characters.
    #[error("Description cannot exceed 100 characters")]
    DescriptionTooLong,

    /// The currency is not one of the supported currency codes.
    #[error("Select a valid currency")]
    InvalidCurrency(String),

    /// The date could not be parsed as a calendar date.
    #[error("Enter a valid date")]
    InvalidDate(String),

    /// A date in the future was used to create an expense.
    ///
    /// Expenses record spending that has already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is in the future")]
    FutureDate(Date),

    /// An imported file was not a JSON array of expense records.
    #[error("Invalid file format")]
    InvalidImportFormat,

    /// The multipart form could not be read as an uploaded file.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing or deserializing JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The exchange rates could not be fetched or decoded.
    #[error("could not fetch exchange rates: {0}")]
    RateFetchError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the expense store or list view.
    #[error("could not acquire the expense store lock")]
    StoreLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError | Error::StoreLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidImportFormat => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid file format".to_owned(),
                    details: "The file must contain a JSON array of expenses, \
                        such as a file created with the export button."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::MultipartError(message) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the uploaded file".to_owned(),
                    details: message,
                },
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            )
                .into_response(),
            Error::SqlError(_) | Error::JSONSerializationError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Could not save your changes".to_owned(),
                    details: "Your data was not changed. Try again later or check the server logs."
                        .to_owned(),
                },
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            )
                .into_response(),
        }
    }
}
