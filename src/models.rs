//! Domain records handed to callers.
//!
//! These are plain data types kept separate from the storage entities in
//! [`crate::entities`]; the `From` impls below are the only place the two
//! representations meet.

use crate::{entities, money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category assigned to expenses recorded without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Language assigned to users registered without one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A registered user. The password hash never leaves the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Contact phone number
    pub phone: String,
    /// Preferred language code
    pub language: String,
    /// Login email, unique and lower-cased
    pub email: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Contact phone number
    pub phone: String,
    /// Preferred language code; blank uses [`DEFAULT_LANGUAGE`]
    pub language: String,
    /// Login email
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// A budget with its ledger-maintained spent amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Store-assigned id
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Amount the user plans to spend
    pub planned_amount: Decimal,
    /// Sum of the budget's live expenses
    pub spent_amount: Decimal,
    /// Free-text period label, e.g. "Monthly"
    pub period: String,
    /// First moment the budget covers
    pub start_date: DateTime<Utc>,
    /// Last moment the budget covers
    pub end_date: DateTime<Utc>,
    /// Free-text description
    pub description: String,
    /// Whether the budget shows in the active list
    pub is_active: bool,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// Planned minus spent; negative when overspent.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.planned_amount - self.spent_amount
    }

    /// True once spending exceeds the plan.
    #[must_use]
    pub fn is_overspent(&self) -> bool {
        self.spent_amount > self.planned_amount
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// Owning user
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Amount the user plans to spend
    pub planned_amount: Decimal,
    /// Free-text period label, e.g. "Monthly"
    pub period: String,
    /// First moment the budget covers
    pub start_date: DateTime<Utc>,
    /// Last moment the budget covers
    pub end_date: DateTime<Utc>,
    /// Free-text description
    pub description: String,
}

/// Editable budget fields. The spent amount is not editable.
#[derive(Debug, Clone)]
pub struct BudgetUpdate {
    /// Display name
    pub name: String,
    /// Amount the user plans to spend
    pub planned_amount: Decimal,
    /// Free-text period label, e.g. "Monthly"
    pub period: String,
    /// First moment the budget covers
    pub start_date: DateTime<Utc>,
    /// Last moment the budget covers
    pub end_date: DateTime<Utc>,
    /// Free-text description
    pub description: String,
    /// Whether the budget shows in the active list
    pub is_active: bool,
}

impl From<&Budget> for BudgetUpdate {
    fn from(budget: &Budget) -> Self {
        Self {
            name: budget.name.clone(),
            planned_amount: budget.planned_amount,
            period: budget.period.clone(),
            start_date: budget.start_date,
            end_date: budget.end_date,
            description: budget.description.clone(),
            is_active: budget.is_active,
        }
    }
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned id
    pub id: i64,
    /// Owning budget
    pub budget_id: i64,
    /// Display name
    pub name: String,
    /// Amount spent, always positive
    pub amount: Decimal,
    /// When the money was spent
    pub date: DateTime<Utc>,
    /// Free-text note
    pub note: String,
    /// Category label
    pub category: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for recording an expense. A `None` or blank category falls back to
/// [`DEFAULT_CATEGORY`].
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Owning budget
    pub budget_id: i64,
    /// Display name
    pub name: String,
    /// Amount spent, always positive
    pub amount: Decimal,
    /// When the money was spent
    pub date: DateTime<Utc>,
    /// Free-text note
    pub note: String,
    /// Category label; `None` or blank uses the default
    pub category: Option<String>,
}

impl From<entities::user::Model> for User {
    fn from(model: entities::user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            surname: model.surname,
            phone: model.phone,
            language: model.language,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

impl From<entities::budget::Model> for Budget {
    fn from(model: entities::budget::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            planned_amount: money::from_cents(model.planned_cents),
            spent_amount: money::from_cents(model.spent_cents),
            period: model.period,
            start_date: model.start_date,
            end_date: model.end_date,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<entities::expense::Model> for Expense {
    fn from(model: entities::expense::Model) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            name: model.name,
            amount: money::from_cents(model.amount_cents),
            date: model.date,
            note: model.note,
            category: model.category,
            created_at: model.created_at,
        }
    }
}

/// Resolves the stored category label for an expense.
#[must_use]
pub fn resolve_category(category: Option<&str>, fallback: &str) -> String {
    match category.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => fallback.to_string(),
    }
}
