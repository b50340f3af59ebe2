//! Expense persistence port.

use async_trait::async_trait;
use expensa_shared::types::UserId;

use super::query::{MatchPredicate, ReportQuery};
use super::report::{ChartRow, ReportPage};
use super::types::{Expense, NewExpense};
use crate::auth::StoreError;

/// Persistence port for expenses and their line items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Inserts an expense with its items atomically.
    ///
    /// Fails with `StoreError::MissingReference` when the customer does not exist.
    async fn insert(&self, expense: NewExpense) -> Result<Expense, StoreError>;

    /// Returns the requested page of report groups and the total group count.
    ///
    /// Groups are keyed on `(customer name, category, item name)` over the
    /// lines of expenses matching `query.predicate` whose item name contains
    /// `query.item_contains`, sorted by that key with a missing customer first.
    async fn report_page(&self, query: &ReportQuery) -> Result<ReportPage, StoreError>;

    /// Per-category totals over every line of expenses matching `predicate`.
    async fn category_chart(&self, predicate: &MatchPredicate) -> Result<Vec<ChartRow>, StoreError>;

    /// Distinct categories of expenses created by `owner`, sorted ascending.
    async fn distinct_categories(
        &self,
        owner: UserId,
        customer: Option<UserId>,
    ) -> Result<Vec<String>, StoreError>;
}
