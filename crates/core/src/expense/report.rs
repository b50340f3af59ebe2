//! Report rows, pagination, and chart rollup.
//!
//! A database store groups, sorts, and pages in SQL. The functions here do
//! the same over plain [`LineRow`]s and define the expected results for
//! in-memory stores.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use expensa_shared::types::{ExpenseId, PageMeta, PageRequest, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::query::contains_ignore_case;

/// One line item joined with its parent expense and customer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRow {
    /// Parent expense.
    pub expense_id: ExpenseId,
    /// Owner of the parent expense.
    pub created_by: UserId,
    /// Billed customer.
    pub customer_id: UserId,
    /// Customer username; `None` when the account is gone.
    pub customer_name: Option<String>,
    /// Parent category.
    pub category: String,
    /// Parent flat discount.
    pub discount: Decimal,
    /// Parent creation time.
    pub created_at: DateTime<Utc>,
    /// Zero-based index of the item within the expense.
    pub position: i32,
    /// Item name.
    pub item_name: String,
    /// Units.
    pub quantity: i32,
    /// Unit price.
    pub rate: Decimal,
}

impl LineRow {
    fn revenue(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.rate)
    }
}

/// One row of the report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Item name.
    pub item_name: String,
    /// Rate of the first line in the group.
    pub price: Decimal,
    /// Category.
    pub category: String,
    /// Summed quantity.
    pub count: i64,
    /// Summed quantity times rate.
    pub total_revenue: Decimal,
    /// Discount of the first line's expense.
    pub discount: Decimal,
    /// Day of the first line's expense.
    pub date: NaiveDate,
    /// Customer username.
    pub customer_name: Option<String>,
}

/// Per-category totals for the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Category.
    pub category: String,
    /// Summed quantity times rate.
    pub total_revenue: Decimal,
    /// Summed quantity.
    pub count: i64,
}

/// One page of report groups as returned by a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPage {
    /// Groups on the requested page.
    pub items: Vec<ReportRow>,
    /// Number of groups across all pages.
    pub total_items: u64,
}

/// Paginated report plus chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    /// Current page of grouped rows.
    pub items: Vec<ReportRow>,
    /// Category rollup over every matched line.
    pub chart: Vec<ChartRow>,
    /// Pagination metadata.
    #[serde(flatten)]
    pub meta: PageMeta,
}

type GroupKey = (Option<String>, String, String);

/// Groups, sorts, and paginates matched line rows.
///
/// Groups are keyed on the raw `(customer name, category, item name)`
/// triple and take their price, discount, and date from the earliest line.
/// Sums saturate at the bounds of [`Decimal`].
#[must_use]
pub fn group_page(rows: &[LineRow], item_contains: Option<&str>, page: PageRequest) -> ReportPage {
    let mut ordered: Vec<&LineRow> = rows
        .iter()
        .filter(|r| item_contains.is_none_or(|needle| contains_ignore_case(&r.item_name, needle)))
        .collect();
    ordered.sort_by_key(|r| (r.created_at, r.expense_id, r.position));

    let mut groups: BTreeMap<GroupKey, ReportRow> = BTreeMap::new();
    for row in ordered {
        let key = (row.customer_name.clone(), row.category.clone(), row.item_name.clone());
        let group = groups.entry(key).or_insert_with(|| ReportRow {
            item_name: row.item_name.clone(),
            price: row.rate,
            category: row.category.clone(),
            count: 0,
            total_revenue: Decimal::ZERO,
            discount: row.discount,
            date: row.created_at.date_naive(),
            customer_name: row.customer_name.clone(),
        });
        group.count = group.count.saturating_add(i64::from(row.quantity));
        group.total_revenue = group.total_revenue.saturating_add(row.revenue());
    }

    let total_items = groups.len() as u64;
    let items = groups
        .into_values()
        .skip(page.offset())
        .take(page.limit as usize)
        .collect();

    ReportPage { items, total_items }
}

/// Per-category totals over every matched line, sorted by category.
#[must_use]
pub fn category_chart(rows: &[LineRow]) -> Vec<ChartRow> {
    let mut chart: BTreeMap<&str, ChartRow> = BTreeMap::new();
    for row in rows {
        let entry = chart.entry(row.category.as_str()).or_insert_with(|| ChartRow {
            category: row.category.clone(),
            total_revenue: Decimal::ZERO,
            count: 0,
        });
        entry.count = entry.count.saturating_add(i64::from(row.quantity));
        entry.total_revenue = entry.total_revenue.saturating_add(row.revenue());
    }
    chart.into_values().collect()
}

/// Builds a full report from matched line rows.
///
/// The item filter narrows the table only; the chart always covers every row.
#[must_use]
pub fn build_report(rows: &[LineRow], item_contains: Option<&str>, page: PageRequest) -> ExpenseReport {
    let ReportPage { items, total_items } = group_page(rows, item_contains, page);
    ExpenseReport {
        items,
        chart: category_chart(rows),
        meta: page.meta(total_items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    struct Rows {
        expense: ExpenseId,
        at: DateTime<Utc>,
        rows: Vec<LineRow>,
    }

    impl Rows {
        fn new() -> Self {
            Self {
                expense: ExpenseId::new(),
                at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 30, 0).unwrap(),
                rows: Vec::new(),
            }
        }

        fn next_expense(&mut self) -> &mut Self {
            self.expense = ExpenseId::new();
            self.at += Duration::hours(1);
            self
        }

        fn line(&mut self, customer: &str, category: &str, item: &str, quantity: i32, rate: Decimal) -> &mut Self {
            let position = self.rows.iter().filter(|r| r.expense_id == self.expense).count();
            self.rows.push(LineRow {
                expense_id: self.expense,
                created_by: UserId::new(),
                customer_id: UserId::new(),
                customer_name: Some(customer.to_string()),
                category: category.to_string(),
                discount: dec!(0),
                created_at: self.at,
                position: i32::try_from(position).unwrap(),
                item_name: item.to_string(),
                quantity,
                rate,
            });
            self
        }
    }

    #[test]
    fn test_groups_sum_quantity_and_revenue() {
        let mut rows = Rows::new();
        rows.line("acme", "Travel", "Taxi", 2, dec!(15));
        rows.next_expense().line("acme", "Travel", "Taxi", 1, dec!(20));

        let report = build_report(&rows.rows, None, PageRequest::default());

        assert_eq!(report.items.len(), 1);
        let taxi = &report.items[0];
        assert_eq!(taxi.count, 3);
        assert_eq!(taxi.total_revenue, dec!(50));
        assert_eq!(taxi.price, dec!(15));
        assert_eq!(taxi.date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(taxi.customer_name.as_deref(), Some("acme"));
    }

    #[test]
    fn test_representatives_come_from_earliest_row() {
        let mut rows = Rows::new();
        rows.line("acme", "Meals", "Lunch", 1, dec!(12));
        rows.next_expense().line("acme", "Meals", "Lunch", 1, dec!(9));
        rows.rows[0].discount = dec!(2);
        rows.rows.reverse();

        let report = build_report(&rows.rows, None, PageRequest::default());
        assert_eq!(report.items[0].price, dec!(12));
        assert_eq!(report.items[0].discount, dec!(2));
    }

    #[test]
    fn test_grouping_key_is_raw() {
        let mut rows = Rows::new();
        rows.line("acme", "Meals", "Lunch", 1, dec!(5))
            .line("acme", "Meals", "lunch", 1, dec!(5))
            .line("acme", "Meals", "Lunch ", 1, dec!(5));

        let report = build_report(&rows.rows, None, PageRequest::default());
        assert_eq!(report.items.len(), 3);
    }

    #[test]
    fn test_sorted_by_customer_category_item() {
        let mut rows = Rows::new();
        rows.line("zeta", "A", "x", 1, dec!(1))
            .line("acme", "B", "a", 1, dec!(1))
            .line("acme", "A", "z", 1, dec!(1))
            .line("acme", "A", "b", 1, dec!(1));

        let report = build_report(&rows.rows, None, PageRequest::default());
        let keys: Vec<_> = report
            .items
            .iter()
            .map(|r| (r.customer_name.clone().unwrap(), r.category.as_str(), r.item_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            [
                ("acme".to_string(), "A", "b"),
                ("acme".to_string(), "A", "z"),
                ("acme".to_string(), "B", "a"),
                ("zeta".to_string(), "A", "x"),
            ]
        );
    }

    #[test]
    fn test_fifteen_groups_paginate_into_two_pages() {
        let mut rows = Rows::new();
        for i in 0..15 {
            rows.line("acme", "Supplies", &format!("item-{i:02}"), 1, dec!(1));
        }

        let first = build_report(&rows.rows, None, PageRequest::new(1, 10));
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.meta.total_items, 15);
        assert_eq!(first.meta.total_pages, 2);

        let second = build_report(&rows.rows, None, PageRequest::new(2, 10));
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.items[0].item_name, "item-10");
        assert_eq!(second.meta.page, 2);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let mut rows = Rows::new();
        rows.line("acme", "Supplies", "Paper", 1, dec!(1));

        let report = build_report(&rows.rows, None, PageRequest::new(3, 10));
        assert!(report.items.is_empty());
        assert_eq!(report.meta.total_items, 1);
        assert_eq!(report.meta.total_pages, 1);
    }

    #[test]
    fn test_item_filter_narrows_table_but_not_chart() {
        let mut rows = Rows::new();
        rows.line("acme", "Travel", "Taxi", 2, dec!(10))
            .line("acme", "Travel", "Train", 1, dec!(40))
            .line("acme", "Meals", "Taxi snacks", 1, dec!(3));

        let report = build_report(&rows.rows, Some("TAXI"), PageRequest::default());

        let names: Vec<_> = report.items.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, ["Taxi snacks", "Taxi"]);

        assert_eq!(
            report.chart,
            vec![
                ChartRow {
                    category: "Meals".into(),
                    total_revenue: dec!(3),
                    count: 1,
                },
                ChartRow {
                    category: "Travel".into(),
                    total_revenue: dec!(60),
                    count: 3,
                },
            ]
        );
    }

    #[test]
    fn test_missing_customer_sorts_first() {
        let mut rows = Rows::new();
        rows.line("acme", "Travel", "Taxi", 1, dec!(1));
        rows.line("ghost", "Travel", "Taxi", 1, dec!(1));
        rows.rows[1].customer_name = None;

        let report = build_report(&rows.rows, None, PageRequest::default());
        assert_eq!(report.items[0].customer_name, None);
    }

    #[test]
    fn test_empty_input() {
        let report = build_report(&[], None, PageRequest::default());
        assert!(report.items.is_empty());
        assert!(report.chart.is_empty());
        assert_eq!(report.meta.total_pages, 0);
    }

    #[test]
    fn test_sums_saturate_instead_of_panicking() {
        let mut rows = Rows::new();
        rows.line("acme", "Travel", "Taxi", 2, Decimal::MAX)
            .line("acme", "Travel", "Taxi", 1, Decimal::MAX);

        let report = build_report(&rows.rows, None, PageRequest::default());
        assert_eq!(report.items[0].total_revenue, Decimal::MAX);
        assert_eq!(report.items[0].count, 3);
        assert_eq!(report.chart[0].total_revenue, Decimal::MAX);
    }

    #[test]
    fn test_serializes_flat_meta() {
        let report = build_report(&[], None, PageRequest::new(2, 5));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["limit"], 5);
        assert_eq!(json["totalItems"], 0);
        assert_eq!(json["totalPages"], 0);
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
