//! The paginated table of recorded expenses and its two-step delete.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, endpoints,
    expense::{
        core::{Expense, ExpenseId},
        lock_expenses,
        store::ExpenseStore,
    },
    html::{
        BUTTON_CANCEL_STYLE, BUTTON_DELETE_STYLE, BUTTON_PAGE_STYLE, CARD_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
    },
    pagination::{clamp_page, page_count, page_slice},
};

/// The max number of graphemes to display in the expense table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 40;

const ROW_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// Which row, if any, is waiting for the user to confirm a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteConfirmation {
    #[default]
    Idle,
    Armed(ExpenseId),
}

impl DeleteConfirmation {
    /// Ask for confirmation before deleting `id`, replacing any other armed row.
    pub fn arm(&mut self, id: ExpenseId) {
        *self = DeleteConfirmation::Armed(id);
    }

    pub fn cancel(&mut self) {
        *self = DeleteConfirmation::Idle;
    }

    /// Confirm the delete of `id`, returning whether `id` was the armed row.
    ///
    /// Confirming a row that is not armed does nothing.
    pub fn confirm(&mut self, id: &ExpenseId) -> bool {
        if self.is_armed(id) {
            *self = DeleteConfirmation::Idle;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self, id: &ExpenseId) -> bool {
        matches!(self, DeleteConfirmation::Armed(armed) if armed == id)
    }
}

/// The state of the expense table that lasts between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseListView {
    /// The 1-based page being shown.
    pub page: usize,
    pub confirmation: DeleteConfirmation,
}

impl Default for ExpenseListView {
    fn default() -> Self {
        Self {
            page: 1,
            confirmation: DeleteConfirmation::Idle,
        }
    }
}

impl ExpenseListView {
    /// Show `page`, clamped to the pages that exist for `item_count` expenses.
    ///
    /// Changing page leaves any armed delete armed.
    pub fn go_to(&mut self, page: usize, item_count: usize) {
        self.page = clamp_page(page, page_count(item_count));
    }
}

/// The state needed to render and page through the expense table.
#[derive(Debug, Clone)]
pub struct ExpenseListState {
    pub expense_store: Arc<Mutex<ExpenseStore>>,
    pub expense_list: Arc<Mutex<ExpenseListView>>,
}

impl FromRef<AppState> for ExpenseListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            expense_list: state.expense_list.clone(),
        }
    }
}

/// The query parameters for changing the page of the expense table.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

/// A route handler that renders the expense table, optionally on a new page.
pub async fn get_expense_list_partial(
    State(state): State<ExpenseListState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let (store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    if let Some(page) = query.page {
        view.go_to(page, store.len());
    }

    expense_list_view(store.expenses(), &view, false).into_response()
}

/// A route handler that asks the user to confirm deleting an expense.
pub async fn arm_delete_endpoint(
    State(state): State<ExpenseListState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let (store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    view.confirmation.arm(expense_id);

    expense_list_view(store.expenses(), &view, false).into_response()
}

/// A route handler that backs out of a pending delete.
pub async fn cancel_delete_endpoint(State(state): State<ExpenseListState>) -> Response {
    let (store, mut view) = match lock_expenses(&state.expense_store, &state.expense_list) {
        Ok(guards) => guards,
        Err(error) => return error.into_alert_response(),
    };

    view.confirmation.cancel();

    expense_list_view(store.expenses(), &view, false).into_response()
}

/// Render the expense table for the current page.
///
/// Set `oob` when the table is sent alongside another fragment so that htmx
/// swaps it in out-of-band.
pub fn expense_list_view(expenses: &[Expense], view: &ExpenseListView, oob: bool) -> Markup {
    let total_pages = page_count(expenses.len());
    let rows = page_slice(expenses, view.page);

    html! {
        div
            id="expense-list"
            class=(CARD_STYLE)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-swap-oob=[oob.then_some("true")]
        {
            h2 class="text-xl font-semibold mb-4" { "Recent Expenses" }

            @if expenses.is_empty() {
                div class="text-center py-8 text-gray-500 dark:text-gray-400"
                {
                    p { "No expenses recorded yet" }
                }
            } @else {
                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-center" } { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for expense in rows {
                                (expense_row_view(expense, view.confirmation.is_armed(&expense.id)))
                            }
                        }
                    }
                }

                @if total_pages > 1 {
                    (pagination_view(view.page, total_pages))
                }
            }
        }
    }
}

fn expense_row_view(expense: &Expense, is_armed: bool) -> Markup {
    let date = expense
        .date
        .format(ROW_DATE_FORMAT)
        .unwrap_or_else(|_| expense.date.date().to_string());
    let (description, full_description) = format_description(&expense.description);
    let delete_url = endpoints::format_endpoint(endpoints::EXPENSE, &expense.id);
    let arm_url = endpoints::format_endpoint(endpoints::ARM_DELETE, &expense.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) title=[full_description] { (description) }
            td class=(TABLE_CELL_STYLE) { (expense.category.label()) }
            td class={ (TABLE_CELL_STYLE) " text-right" }
            {
                (format!("{:.2} {}", expense.amount, expense.currency.code()))
            }
            td class={ (TABLE_CELL_STYLE) " text-center" }
            {
                @if is_armed {
                    div class="flex items-center justify-center gap-2"
                    {
                        button
                            type="button"
                            hx-delete=(delete_url)
                            aria-label="Confirm delete"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }

                        button
                            type="button"
                            hx-delete=(endpoints::CANCEL_DELETE)
                            aria-label="Cancel delete"
                            class=(BUTTON_CANCEL_STYLE)
                        {
                            "Cancel"
                        }
                    }
                } @else {
                    button
                        type="button"
                        hx-post=(arm_url)
                        aria-label={ "Delete expense: " (expense.description) }
                        class=(BUTTON_DELETE_STYLE)
                    {
                        (trash_icon())
                    }
                }
            }
        }
    }
}

fn pagination_view(page: usize, total_pages: usize) -> Markup {
    let previous_page = page.saturating_sub(1).max(1);
    let next_page = (page + 1).min(total_pages);
    let previous_url = format!("{}?page={previous_page}", endpoints::EXPENSE_LIST_PARTIAL);
    let next_url = format!("{}?page={next_page}", endpoints::EXPENSE_LIST_PARTIAL);

    html! {
        nav class="flex justify-center items-center gap-2 mt-4" aria-label="Expense pages"
        {
            button
                type="button"
                hx-get=(previous_url)
                disabled[page <= 1]
                aria-label="Previous page"
                class=(BUTTON_PAGE_STYLE)
            {
                "Previous"
            }

            span class="px-3 py-1" { "Page " (page) " of " (total_pages) }

            button
                type="button"
                hx-get=(next_url)
                disabled[page >= total_pages]
                aria-label="Next page"
                class=(BUTTON_PAGE_STYLE)
            {
                "Next"
            }
        }
    }
}

fn trash_icon() -> Markup {
    // Icon adapted from https://heroicons.com/ (trash, outline)
    html! {
        svg
            xmlns="http://www.w3.org/2000/svg"
            fill="none"
            viewBox="0 0 24 24"
            stroke-width="1.5"
            stroke="currentColor"
            aria-hidden="true"
            class="w-4 h-4"
        {
            path
                stroke-linecap="round"
                stroke-linejoin="round"
                d="m14.74 9-.346 9m-4.788 0L9.26 9m9.968-3.21c.342.052.682.107 1.022.166m-1.022-.165L18.16 19.673a2.25 2.25 0 0 1-2.244 2.077H8.084a2.25 2.25 0 0 1-2.244-2.077L4.772 5.79m14.456 0a48.108 48.108 0 0 0-3.478-.397m-12 .562c.34-.059.68-.114 1.022-.165m0 0a48.11 48.11 0 0 1 3.478-.397m7.5 0v-.916c0-1.18-.91-2.164-2.09-2.201a51.964 51.964 0 0 0-3.32 0c-1.18.037-2.09 1.022-2.09 2.201v.916m7.5 0a48.667 48.667 0 0 0-7.5 0" {}
        }
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}
