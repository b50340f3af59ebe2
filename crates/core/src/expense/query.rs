//! Report query construction.
//!
//! Nothing here touches a store: filters and caller identity become a
//! [`ReportQuery`] whose [`MatchPredicate`] a store executes.

use chrono::{DateTime, NaiveDate, Utc};
use expensa_shared::Role;
use expensa_shared::types::{PageRequest, UserId};
use serde::Deserialize;

use super::error::ExpenseError;

/// Row-level visibility derived from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Admins see every expense.
    All,
    /// Everyone else sees only expenses they created.
    OwnedBy(UserId),
}

impl AccessScope {
    /// Scope for a caller with `role`.
    #[must_use]
    pub const fn for_caller(user_id: UserId, role: Role) -> Self {
        match role {
            Role::Admin => Self::All,
            Role::User => Self::OwnedBy(user_id),
        }
    }

    /// Whether an expense created by `created_by` is visible.
    #[must_use]
    pub fn permits(&self, created_by: UserId) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(owner) => *owner == created_by,
        }
    }
}

/// Expense-level match stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPredicate {
    /// Visibility.
    pub scope: AccessScope,
    /// Exact billed customer.
    pub customer: Option<UserId>,
    /// Inclusive lower bound on creation time.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the category.
    pub category_contains: Option<String>,
}

impl MatchPredicate {
    /// Predicate that only applies `scope`.
    #[must_use]
    pub const fn scoped(scope: AccessScope) -> Self {
        Self {
            scope,
            customer: None,
            created_from: None,
            created_to: None,
            category_contains: None,
        }
    }

    /// Evaluates the predicate against expense-level fields.
    #[must_use]
    pub fn matches(
        &self,
        created_by: UserId,
        customer: UserId,
        category: &str,
        created_at: DateTime<Utc>,
    ) -> bool {
        self.scope.permits(created_by)
            && self.customer.is_none_or(|c| c == customer)
            && self.created_from.is_none_or(|from| created_at >= from)
            && self.created_to.is_none_or(|to| created_at <= to)
            && self
                .category_contains
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(category, needle))
    }
}

/// Case-insensitive literal substring test.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Raw query-string filters for `GET /expense`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    /// Customer ID.
    pub customer: Option<String>,
    /// Lower date bound, RFC 3339 or `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Upper date bound, RFC 3339 or `YYYY-MM-DD` (whole day).
    pub to: Option<String>,
    /// Category substring.
    pub category: Option<String>,
    /// Item-name substring.
    pub item: Option<String>,
    /// Page number, default 1.
    pub page: Option<u32>,
    /// Page size, default 10.
    pub limit: Option<u32>,
}

/// A fully resolved report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// Expense-level match.
    pub predicate: MatchPredicate,
    /// Case-insensitive substring on item name; applies to the table only.
    pub item_contains: Option<String>,
    /// Requested page.
    pub page: PageRequest,
}

impl ReportQuery {
    /// Resolves filters for a caller.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::InvalidCustomer` for an unparseable customer ID
    /// and `ExpenseError::Validation` for bad dates or pagination.
    pub fn build(filter: ReportFilter, caller: UserId, role: Role) -> Result<Self, ExpenseError> {
        let page = PageRequest::new(
            filter.page.unwrap_or(1),
            filter.limit.unwrap_or(10),
        );
        page.validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        let customer = non_empty(filter.customer)
            .map(|raw| raw.parse::<UserId>().map_err(|_| ExpenseError::InvalidCustomer))
            .transpose()?;

        let created_from = non_empty(filter.from)
            .map(|raw| parse_bound(&raw, Bound::Start))
            .transpose()?;
        let created_to = non_empty(filter.to)
            .map(|raw| parse_bound(&raw, Bound::End))
            .transpose()?;

        Ok(Self {
            predicate: MatchPredicate {
                scope: AccessScope::for_caller(caller, role),
                customer,
                created_from,
                created_to,
                category_contains: non_empty(filter.category),
            },
            item_contains: non_empty(filter.item),
            page,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, ExpenseError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ExpenseError::Validation(format!("Invalid date: {raw}")))?;
    let time = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| ExpenseError::Validation(format!("Invalid date: {raw}")))
}
