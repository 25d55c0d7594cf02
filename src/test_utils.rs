//! Shared test utilities for `BudgetKeeper`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{budget, expense, user},
    errors::Result,
    models::{Budget, Expense, NewBudget, NewExpense, NewUser, User},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Password given to every test user.
pub const TEST_PASSWORD: &str = "hunter22";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registration input with sensible defaults and the given email.
pub fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Test".to_string(),
        surname: "User".to_string(),
        phone: "+1 555 0100".to_string(),
        language: String::new(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
    }
}

/// Registers a test user with [`TEST_PASSWORD`].
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<User> {
    user::register_user(db, new_user(email)).await
}

/// Budget input with sensible defaults.
///
/// # Defaults
/// * `planned_amount`: 1000
/// * `period`: "Monthly", starting now and lasting 30 days
pub fn new_budget(user_id: i64, name: &str) -> NewBudget {
    let start = Utc::now();
    NewBudget {
        user_id,
        name: name.to_string(),
        planned_amount: dec!(1000),
        period: "Monthly".to_string(),
        start_date: start,
        end_date: start + Duration::days(30),
        description: String::new(),
    }
}

/// Creates a test budget with the defaults of [`new_budget`].
pub async fn create_test_budget(db: &DatabaseConnection, user_id: i64, name: &str) -> Result<Budget> {
    budget::create_budget(db, new_budget(user_id, name)).await
}

/// Expense input with sensible defaults.
///
/// # Defaults
/// * `name`: `"Test expense"`
/// * `date`: now
/// * `category`: None (falls back to the default category)
pub fn new_expense(budget_id: i64, amount: Decimal) -> NewExpense {
    NewExpense {
        budget_id,
        name: "Test expense".to_string(),
        amount,
        date: Utc::now(),
        note: String::new(),
        category: None,
    }
}

/// Records a test expense through the expense mutator.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    budget_id: i64,
    amount: Decimal,
) -> Result<Expense> {
    expense::create_expense(db, new_expense(budget_id, amount)).await
}

/// Records a test expense with an explicit date.
pub async fn create_dated_expense(
    db: &DatabaseConnection,
    budget_id: i64,
    amount: Decimal,
    date: DateTime<Utc>,
) -> Result<Expense> {
    let mut input = new_expense(budget_id, amount);
    input.date = date;
    expense::create_expense(db, input).await
}

/// Sets up a complete test environment with a user and one budget.
/// Returns (db, user, budget) for common test scenarios.
pub async fn setup_with_budget() -> Result<(DatabaseConnection, User, Budget)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    let budget = create_test_budget(&db, user.id, "Test Budget").await?;
    Ok((db, user, budget))
}
