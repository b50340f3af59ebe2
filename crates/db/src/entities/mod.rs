//! `SeaORM` entities.

pub mod prelude;

pub mod expense_items;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
