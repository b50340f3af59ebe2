//! Expense domain types.

use chrono::{DateTime, Utc};
use expensa_shared::types::{ExpenseId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single line on an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    /// Item name.
    pub name: String,
    /// Units, at least 1.
    pub quantity: i32,
    /// Unit price, non-negative.
    pub rate: Decimal,
}

/// A stored expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Account that logged the expense.
    pub created_by: UserId,
    /// Account the expense is billed to.
    pub customer: UserId,
    /// Title.
    pub title: String,
    /// Free-text category.
    pub category: String,
    /// Ordered line items.
    pub expense_items: Vec<ExpenseItem>,
    /// VAT percentage.
    pub vat: Decimal,
    /// Flat discount.
    pub discount: Decimal,
    /// Sum of quantity times rate.
    pub sub_total: Decimal,
    /// Discounted subtotal with VAT applied.
    pub total: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert payload with totals already computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    /// Owner.
    pub created_by: UserId,
    /// Billed customer.
    pub customer: UserId,
    /// Title.
    pub title: String,
    /// Category.
    pub category: String,
    /// Line items, in order.
    pub items: Vec<ExpenseItem>,
    /// VAT percentage.
    pub vat: Decimal,
    /// Flat discount.
    pub discount: Decimal,
    /// Computed subtotal.
    pub sub_total: Decimal,
    /// Computed total.
    pub total: Decimal,
}

/// Longest title, category, or item name the schema stores.
pub const MAX_TEXT_LEN: usize = 255;

/// Line item as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseItemInput {
    /// Item name, non-blank.
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Expense item name is required"),
        custom(function = "item_name_fits")
    )]
    pub name: String,
    /// Units.
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Unit price.
    #[validate(custom(function = "rate_not_negative"))]
    pub rate: Decimal,
}

/// Payload for `POST /expense`. Totals and ownership are never read from it.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseInput {
    /// Customer account ID.
    #[serde(default)]
    #[validate(custom(function = "valid_customer_id"))]
    pub customer: String,
    /// Title, non-blank.
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Title is required"),
        custom(function = "title_fits")
    )]
    pub title: String,
    /// Category, non-blank.
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Category is required"),
        custom(function = "category_fits")
    )]
    pub category: String,
    /// At least one line item.
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one expense item is required"), nested)]
    pub expense_items: Vec<ExpenseItemInput>,
    /// VAT percentage, defaults to 0.
    #[serde(default)]
    #[validate(custom(function = "vat_not_negative"))]
    pub vat: Decimal,
    /// Flat discount, defaults to 0.
    #[serde(default)]
    #[validate(custom(function = "discount_not_negative"))]
    pub discount: Decimal,
}

impl CreateExpenseInput {
    /// Trims text fields ahead of validation.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.customer = self.customer.trim().to_string();
        self.title = self.title.trim().to_string();
        self.category = self.category.trim().to_string();
        for item in &mut self.expense_items {
            item.name = item.name.trim().to_string();
        }
        self
    }
}

fn not_negative(value: Decimal, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        Err(ValidationError::new(code).with_message(message.into()))
    } else {
        Ok(())
    }
}

fn rate_not_negative(rate: &Decimal) -> Result<(), ValidationError> {
    not_negative(*rate, "rate", "Rate cannot be negative")
}

fn vat_not_negative(vat: &Decimal) -> Result<(), ValidationError> {
    not_negative(*vat, "vat", "VAT cannot be negative")
}

fn discount_not_negative(discount: &Decimal) -> Result<(), ValidationError> {
    not_negative(*discount, "discount", "Discount cannot be negative")
}

fn fits(value: &str, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_TEXT_LEN {
        Err(ValidationError::new(code).with_message(message.into()))
    } else {
        Ok(())
    }
}

fn title_fits(title: &str) -> Result<(), ValidationError> {
    fits(title, "title", "Title must be at most 255 characters")
}

fn category_fits(category: &str) -> Result<(), ValidationError> {
    fits(category, "category", "Category must be at most 255 characters")
}

fn item_name_fits(name: &str) -> Result<(), ValidationError> {
    fits(name, "name", "Expense item name must be at most 255 characters")
}

fn valid_customer_id(customer: &str) -> Result<(), ValidationError> {
    if customer.is_empty() {
        return Err(ValidationError::new("customer").with_message("Customer is required".into()));
    }
    uuid::Uuid::parse_str(customer)
        .map(|_| ())
        .map_err(|_| ValidationError::new("customer").with_message("Invalid customer ID".into()))
}
