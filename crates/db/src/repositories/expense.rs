//! Expense repository for database operations.
//!
//! The whole report runs in SQL. Line items are joined to their expense and
//! filtered by the match stage. The table groups them by customer username,
//! category, and item name, then sorts and pages the groups. A separate
//! `COUNT(*)` over the same groups yields the total, and the chart is a
//! second `GROUP BY` on category.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use expensa_core::auth::StoreError;
use expensa_core::expense::{
    AccessScope, ChartRow, Expense, ExpenseItem, ExpenseStore, MatchPredicate, NewExpense,
    ReportPage, ReportQuery, ReportRow,
};
use expensa_shared::types::{ExpenseId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{
    Alias, Expr, Func, LikeExpr, NullOrdering, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    RelationTrait, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::store_err;
use crate::entities::{expense_items, expenses, users};

/// Expense repository backed by the `expenses` and `expense_items` tables.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ReportRowModel {
    customer_name: Option<String>,
    category: String,
    item_name: String,
    price: Decimal,
    count: i64,
    total_revenue: Decimal,
    discount: Decimal,
    first_created_at: DateTime<FixedOffset>,
}

impl From<ReportRowModel> for ReportRow {
    fn from(row: ReportRowModel) -> Self {
        Self {
            item_name: row.item_name,
            price: row.price,
            category: row.category,
            count: row.count,
            total_revenue: row.total_revenue,
            discount: row.discount,
            date: row.first_created_at.with_timezone(&Utc).date_naive(),
            customer_name: row.customer_name,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ChartRowModel {
    category: String,
    total_revenue: Decimal,
    count: i64,
}

impl From<ChartRowModel> for ChartRow {
    fn from(row: ChartRowModel) -> Self {
        Self {
            category: row.category,
            total_revenue: row.total_revenue,
            count: row.count,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    total: i64,
}

/// Escapes `LIKE` metacharacters and wraps the needle for a substring match.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(column) LIKE '%needle%'` with backslash escapes.
fn contains_ignore_case(column: Expr, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column))
        .like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}

/// Value taken from the earliest line of a group.
fn earliest(column: &str) -> SimpleExpr {
    Expr::cust(format!(
        r#"(ARRAY_AGG({column} ORDER BY "expenses"."created_at", "expenses"."id", "expense_items"."position"))[1]"#
    ))
}

fn quantity_sum() -> SimpleExpr {
    Expr::col((expense_items::Entity, expense_items::Column::Quantity)).sum()
}

fn revenue_sum() -> SimpleExpr {
    Expr::expr(
        Expr::col((expense_items::Entity, expense_items::Column::Quantity))
            .mul(Expr::col((expense_items::Entity, expense_items::Column::Rate))),
    )
    .sum()
}

/// Byte-order sort key, so names compare the same way as Rust strings.
fn byte_order(column: &str) -> SimpleExpr {
    Expr::cust(format!(r#"{column} COLLATE "C""#))
}

/// Line items of every expense passing the match stage; no columns selected yet.
fn matched_lines(predicate: &MatchPredicate) -> Select<expense_items::Entity> {
    let mut query = expense_items::Entity::find()
        .select_only()
        .join(JoinType::InnerJoin, expense_items::Relation::Expenses.def());

    if let AccessScope::OwnedBy(owner) = predicate.scope {
        query = query.filter(expenses::Column::CreatedBy.eq(owner.into_inner()));
    }
    if let Some(customer) = predicate.customer {
        query = query.filter(expenses::Column::CustomerId.eq(customer.into_inner()));
    }
    if let Some(from) = predicate.created_from {
        query = query.filter(expenses::Column::CreatedAt.gte(from));
    }
    if let Some(to) = predicate.created_to {
        query = query.filter(expenses::Column::CreatedAt.lte(to));
    }
    if let Some(needle) = &predicate.category_contains {
        query = query.filter(contains_ignore_case(
            Expr::col((expenses::Entity, expenses::Column::Category)),
            needle,
        ));
    }

    query
}

/// Report groups over matched lines, unsorted and unpaged.
pub(crate) fn report_groups_query(query: &ReportQuery) -> Select<expense_items::Entity> {
    let mut select = matched_lines(&query.predicate)
        .join(JoinType::LeftJoin, expenses::Relation::Customer.def())
        .column_as(users::Column::Username, "customer_name")
        .column_as(expenses::Column::Category, "category")
        .column_as(expense_items::Column::Name, "item_name")
        .column_as(earliest(r#""expense_items"."rate""#), "price")
        .column_as(quantity_sum(), "count")
        .column_as(revenue_sum(), "total_revenue")
        .column_as(earliest(r#""expenses"."discount""#), "discount")
        .column_as(
            Expr::col((expenses::Entity, expenses::Column::CreatedAt)).min(),
            "first_created_at",
        )
        .group_by(users::Column::Username)
        .group_by(expenses::Column::Category)
        .group_by(expense_items::Column::Name);

    if let Some(needle) = &query.item_contains {
        select = select.filter(contains_ignore_case(
            Expr::col((expense_items::Entity, expense_items::Column::Name)),
            needle,
        ));
    }

    select
}

/// One sorted page of report groups; a missing customer sorts first.
pub(crate) fn report_page_query(query: &ReportQuery) -> Select<expense_items::Entity> {
    report_groups_query(query)
        .order_by_with_nulls(
            byte_order(r#""users"."username""#),
            Order::Asc,
            NullOrdering::First,
        )
        .order_by(byte_order(r#""expenses"."category""#), Order::Asc)
        .order_by(byte_order(r#""expense_items"."name""#), Order::Asc)
        .limit(u64::from(query.page.limit))
        .offset(query.page.offset() as u64)
}

/// Number of report groups across all pages.
pub(crate) fn group_count_query(query: &ReportQuery) -> SelectStatement {
    Query::select()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"))
        .from_subquery(report_groups_query(query).into_query(), Alias::new("report_groups"))
        .to_owned()
}

/// Per-category chart over matched lines; the item filter never applies.
pub(crate) fn chart_query(predicate: &MatchPredicate) -> Select<expense_items::Entity> {
    matched_lines(predicate)
        .column_as(expenses::Column::Category, "category")
        .column_as(revenue_sum(), "total_revenue")
        .column_as(quantity_sum(), "count")
        .group_by(expenses::Column::Category)
        .order_by(byte_order(r#""expenses"."category""#), Order::Asc)
}

/// Builds the distinct-category lookup.
pub(crate) fn categories_query(owner: UserId, customer: Option<UserId>) -> Select<expenses::Entity> {
    let mut query = expenses::Entity::find()
        .select_only()
        .column(expenses::Column::Category)
        .distinct()
        .filter(expenses::Column::CreatedBy.eq(owner.into_inner()));

    if let Some(customer) = customer {
        query = query.filter(expenses::Column::CustomerId.eq(customer.into_inner()));
    }

    query.order_by_asc(expenses::Column::Category)
}

fn to_expense(model: expenses::Model, items: Vec<ExpenseItem>) -> Expense {
    Expense {
        id: ExpenseId::from_uuid(model.id),
        created_by: UserId::from_uuid(model.created_by),
        customer: UserId::from_uuid(model.customer_id),
        title: model.title,
        category: model.category,
        expense_items: items,
        vat: model.vat,
        discount: model.discount,
        sub_total: model.sub_total,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl ExpenseStore for ExpenseRepository {
    async fn insert(&self, expense: NewExpense) -> Result<Expense, StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let customer_exists = users::Entity::find_by_id(expense.customer.into_inner())
            .one(&txn)
            .await
            .map_err(store_err)?
            .is_some();
        if !customer_exists {
            return Err(StoreError::MissingReference);
        }

        let now = Utc::now().fixed_offset();
        let header = expenses::ActiveModel {
            id: Set(Uuid::now_v7()),
            created_by: Set(expense.created_by.into_inner()),
            customer_id: Set(expense.customer.into_inner()),
            title: Set(expense.title),
            category: Set(expense.category),
            vat: Set(expense.vat),
            discount: Set(expense.discount),
            sub_total: Set(expense.sub_total),
            total: Set(expense.total),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(store_err)?;

        let mut items = Vec::with_capacity(expense.items.len());
        for (position, item) in expense.items.into_iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Backend("too many expense items".into()))?;
            let row = expense_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                expense_id: Set(header.id),
                position: Set(position),
                name: Set(item.name),
                quantity: Set(item.quantity),
                rate: Set(item.rate),
            }
            .insert(&txn)
            .await
            .map_err(store_err)?;

            items.push(ExpenseItem {
                name: row.name,
                quantity: row.quantity,
                rate: row.rate,
            });
        }

        txn.commit().await.map_err(store_err)?;

        Ok(to_expense(header, items))
    }

    async fn report_page(&self, query: &ReportQuery) -> Result<ReportPage, StoreError> {
        let backend = self.db.get_database_backend();
        let total_items = GroupCount::find_by_statement(backend.build(&group_count_query(query)))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map_or(0, |count| u64::try_from(count.total).unwrap_or_default());

        let items = report_page_query(query)
            .into_model::<ReportRowModel>()
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(ReportRow::from)
            .collect();

        Ok(ReportPage { items, total_items })
    }

    async fn category_chart(&self, predicate: &MatchPredicate) -> Result<Vec<ChartRow>, StoreError> {
        chart_query(predicate)
            .into_model::<ChartRowModel>()
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(ChartRow::from).collect())
            .map_err(store_err)
    }

    async fn distinct_categories(
        &self,
        owner: UserId,
        customer: Option<UserId>,
    ) -> Result<Vec<String>, StoreError> {
        categories_query(owner, customer)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(store_err)
    }
}
