//! The form for recording a new expense and its validation rules.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, endpoints,
    expense::core::{
        Category, Currency, Expense, ExpenseId, MAX_AMOUNT, MAX_DESCRIPTION_LENGTH,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

const FORM_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// The raw values submitted by the expense form.
///
/// Every field is kept as text so that the form can be shown again with
/// exactly what the user entered when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseFormData {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub date: String,
}

impl ExpenseFormData {
    /// A blank form dated `today` with the default currency selected.
    pub fn new(today: Date) -> Self {
        Self {
            currency: Currency::default().code().to_owned(),
            date: today.to_string(),
            ..Default::default()
        }
    }

    /// Check the form values and build a new expense from them.
    ///
    /// The checks run in the order the fields appear to the user and stop at
    /// the first failure.
    ///
    /// # Errors
    ///
    /// Returns the validation error for the first invalid field. Its message
    /// is meant to be shown to the user as is.
    pub fn validate(&self, today: Date) -> Result<Expense, Error> {
        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or(Error::AmountNotANumber)?;

        if amount <= 0.0 {
            return Err(Error::AmountNotPositive);
        }

        if amount > MAX_AMOUNT {
            return Err(Error::AmountTooLarge);
        }

        let category = self
            .category
            .parse::<Category>()
            .map_err(|_| Error::InvalidCategory(self.category.clone()))?;

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::DescriptionTooLong);
        }

        let currency = self
            .currency
            .parse::<Currency>()
            .map_err(|_| Error::InvalidCurrency(self.currency.clone()))?;

        let date = Date::parse(self.date.trim(), FORM_DATE_FORMAT)
            .map_err(|_| Error::InvalidDate(self.date.clone()))?;

        if date > today {
            return Err(Error::FutureDate(date));
        }

        Ok(Expense {
            id: ExpenseId::new(),
            amount,
            category,
            description: self.description.clone(),
            currency,
            date: date.midnight().assume_utc(),
        })
    }

    /// Clear the form after a successful submission.
    ///
    /// The currency is kept since consecutive expenses tend to share one.
    pub fn reset(self, today: Date) -> Self {
        Self {
            currency: self.currency,
            ..Self::new(today)
        }
    }
}

/// Render the expense form filled in with `values`.
///
/// `error_message` is shown above the submit button when not empty.
pub fn expense_form_view(values: &ExpenseFormData, max_date: Date, error_message: &str) -> Markup {
    let category_placeholder_selected = values.category.parse::<Category>().is_err();

    html! {
        form
            id="expense-form"
            hx-post=(endpoints::EXPENSES_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button"
            hx-indicator="#indicator"
            aria-label="Add expense form"
            class="w-full"
        {
            div class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        min="0.01"
                        step="0.01"
                        max="1000000"
                        placeholder="0.00"
                        required
                        value=(values.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select
                        name="category"
                        id="category"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[category_placeholder_selected] { "Select category" }

                        @for category in Category::ALL {
                            option
                                value=(category.as_str())
                                selected[values.category == category.as_str()]
                            {
                                (category.label())
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        max=(max_date)
                        required
                        value=(values.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                    select
                        name="currency"
                        id="currency"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for currency in Currency::ALL {
                            option
                                value=(currency.code())
                                selected[values.currency == currency.code()]
                            {
                                (currency.code()) " - " (currency.name())
                            }
                        }
                    }
                }

                div class="md:col-span-2"
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        maxlength=(MAX_DESCRIPTION_LENGTH)
                        placeholder="What was it for?"
                        required
                        value=(values.description)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p role="alert" class="mt-4 text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" id="indicator" class={ "mt-4 w-full " (BUTTON_PRIMARY_STYLE) }
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Add Expense"
            }
        }
    }
}
