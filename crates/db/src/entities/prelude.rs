//! Entity re-exports.

pub use super::expense_items::Entity as ExpenseItems;
pub use super::expenses::Entity as Expenses;
pub use super::users::Entity as Users;
