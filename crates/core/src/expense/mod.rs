//! Expense entry and reporting.
//!
//! Reporting is split in two halves:
//! - [`query`] turns request filters plus the caller's identity into a
//!   [`MatchPredicate`] (plain data a store can translate and tests can inspect)
//! - a store groups, sorts, pages, and charts the matching lines; [`report`]
//!   holds the row types and an in-memory rendition of the same rollup

mod error;
pub mod query;
pub mod report;
mod service;
mod store;
pub mod totals;
mod types;


pub use error::ExpenseError;
pub use query::{AccessScope, MatchPredicate, ReportFilter, ReportQuery};
pub use report::{
    ChartRow, ExpenseReport, LineRow, ReportPage, ReportRow, build_report, category_chart, group_page,
};
pub use service::ExpenseService;
pub use store::ExpenseStore;
pub use totals::{Totals, compute_totals};
pub use types::{
    CreateExpenseInput, Expense, ExpenseItem, ExpenseItemInput, MAX_TEXT_LEN, NewExpense,
};

#[cfg(test)]
pub use store::MockExpenseStore;
