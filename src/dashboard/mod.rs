//! Dashboard module
//!
//! Provides the chart of one year's expenses and the totals of every year.

mod charts;
mod handlers;
mod tables;

pub use handlers::{get_chart_page, get_totals_page};
