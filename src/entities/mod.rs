//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities are the storage schema; business code works with the
//! domain records in [`crate::models`] and converts at the boundary.

/// Budgets owned by a user
pub mod budget;
/// Expenses recorded against a budget
pub mod expense;
/// Registered users
pub mod user;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
