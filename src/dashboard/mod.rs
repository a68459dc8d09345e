//! Dashboard module
//!
//! Provides the single page of the app: the currency ticker, the expense form
//! and table, the total spent and a chart of spending by category.

mod aggregation;
mod charts;
mod handlers;
mod preferences;

pub use handlers::{get_dashboard_page, get_summary_partial};
pub use preferences::toggle_dark_mode_endpoint;
