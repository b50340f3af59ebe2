//! Expense entry, reporting, and category lookup.

use std::sync::Arc;

use expensa_shared::Role;
use expensa_shared::types::UserId;
use validator::Validate;

use super::error::ExpenseError;
use super::query::{ReportFilter, ReportQuery};
use super::report::ExpenseReport;
use super::store::ExpenseStore;
use super::totals::compute_totals;
use super::types::{CreateExpenseInput, Expense, ExpenseItem, NewExpense};
use crate::auth::validation::describe;

/// Expense workflows over an [`ExpenseStore`].
#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseStore>,
}

impl ExpenseService {
    /// Creates a new expense service.
    pub fn new(expenses: Arc<dyn ExpenseStore>) -> Self {
        Self { expenses }
    }

    /// Records an expense owned by `owner`.
    ///
    /// Subtotal and total are always computed here; the payload cannot set them.
    pub async fn create(
        &self,
        owner: UserId,
        input: CreateExpenseInput,
    ) -> Result<Expense, ExpenseError> {
        let input = input.normalized();
        input
            .validate()
            .map_err(|e| ExpenseError::Validation(describe(&e)))?;

        let customer = input
            .customer
            .parse::<UserId>()
            .map_err(|_| ExpenseError::InvalidCustomer)?;

        let items: Vec<ExpenseItem> = input
            .expense_items
            .into_iter()
            .map(|item| ExpenseItem {
                name: item.name,
                quantity: item.quantity,
                rate: item.rate,
            })
            .collect();
        let totals = compute_totals(&items, input.discount, input.vat)
            .ok_or_else(|| ExpenseError::Validation("Amount is too large".into()))?;

        let expense = self
            .expenses
            .insert(NewExpense {
                created_by: owner,
                customer,
                title: input.title,
                category: input.category,
                items,
                vat: input.vat,
                discount: input.discount,
                sub_total: totals.sub_total,
                total: totals.total,
            })
            .await?;

        tracing::info!(expense_id = %expense.id, owner = %owner, total = %expense.total, "expense created");
        Ok(expense)
    }

    /// Runs the grouped report for a caller.
    ///
    /// Non-admin callers only ever see expenses they created.
    pub async fn report(
        &self,
        caller: UserId,
        role: Role,
        filter: ReportFilter,
    ) -> Result<ExpenseReport, ExpenseError> {
        let query = ReportQuery::build(filter, caller, role)?;
        let page = self.expenses.report_page(&query).await?;
        let chart = self.expenses.category_chart(&query.predicate).await?;
        tracing::debug!(groups = page.total_items, categories = chart.len(), "report groups matched");

        Ok(ExpenseReport {
            items: page.items,
            chart,
            meta: query.page.meta(page.total_items),
        })
    }

    /// Distinct categories of expenses created by `owner`, optionally for one customer.
    pub async fn categories(
        &self,
        owner: UserId,
        customer: Option<&str>,
    ) -> Result<Vec<String>, ExpenseError> {
        let customer = customer
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| c.parse::<UserId>().map_err(|_| ExpenseError::InvalidCustomer))
            .transpose()?;

        Ok(self.expenses.distinct_categories(owner, customer).await?)
    }
}
