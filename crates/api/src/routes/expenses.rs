//! Expense routes: creation, the grouped report, and category lookup.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use expensa_core::expense::{CreateExpenseInput, Expense, ExpenseReport, ReportFilter};
use serde::Deserialize;

use crate::AppState;
use crate::extractors::{AppJson, AppQuery};
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, ApiResult};

/// Routes reserved for admins.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/expense", get(report))
}

/// Routes open to admins and regular users.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/expense", post(create_expense))
        .route("/expense/category", get(categories))
}

/// Query parameters for `GET /expense/category`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    /// Restrict to one customer.
    pub customer: Option<String>,
}

/// POST /expense - Record an expense owned by the caller.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreateExpenseInput>,
) -> ApiResult<Expense> {
    let expense = state.expenses.create(auth.user_id(), payload).await?;
    Ok(ApiResponse::ok("Expense created successfully", expense))
}

/// GET /expense - Filtered, grouped, paginated report with a category chart.
async fn report(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(filter): AppQuery<ReportFilter>,
) -> ApiResult<ExpenseReport> {
    let report = state
        .expenses
        .report(auth.user_id(), auth.role(), filter)
        .await?;
    Ok(ApiResponse::ok("Expenses filtered successfully", report))
}

/// GET /expense/category - Distinct categories of the caller's expenses.
async fn categories(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<CategoryQuery>,
) -> ApiResult<Vec<String>> {
    let categories = state
        .expenses
        .categories(auth.user_id(), query.customer.as_deref())
        .await?;
    Ok(ApiResponse::ok("Categories fetched successfully", categories))
}
