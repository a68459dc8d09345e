//! Totals of expenses grouped by category for the dashboard chart.

use crate::expense::{Category, Expense};

/// The colours assigned to categories in the order they first appear.
pub const CHART_PALETTE: [&str; 5] = ["#2563eb", "#7c3aed", "#db2777", "#ea580c", "#16a34a"];

/// The sum of the expenses in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    /// The nominal sum of the amounts, currencies are not converted.
    pub total: f64,
    /// The chart colour, one of [CHART_PALETTE].
    pub color: &'static str,
}

/// Sum `expenses` by category.
///
/// Groups are ordered by the first expense in each category and coloured by
/// cycling through [CHART_PALETTE] in that order.
pub fn aggregate_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for expense in expenses {
        match totals
            .iter_mut()
            .find(|total| total.category == expense.category)
        {
            Some(total) => total.total += expense.amount,
            None => {
                let color = CHART_PALETTE[totals.len() % CHART_PALETTE.len()];
                totals.push(CategoryTotal {
                    category: expense.category,
                    total: expense.amount,
                    color,
                });
            }
        }
    }

    totals
}
