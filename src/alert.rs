//! Alert messages shown in the `#alert-container` element at the bottom of the page.
//!
//! Alerts are returned as HTML fragments by endpoints that do not otherwise
//! render a view, e.g. file import or failed saves. They can be dismissed by
//! clicking the close button.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// An alert message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::Error { message, details } => (true, message, details),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 rounded-lg shadow text-red-800 bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 rounded-lg shadow text-green-800 bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800"
        };

        html! {
            div
                class=(container_style)
                role="alert"
                data-alert-type=(if is_error { "error" } else { "success" })
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty()
                    {
                        p class="mt-1 text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="ms-4 text-lg leading-none cursor-pointer bg-transparent"
                    onclick="this.parentElement.remove()"
                {
                    "×"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
