//! Budget entity - A planned spending envelope over a period.
//!
//! Amounts are stored in cents so that ledger deltas and sums stay exact
//! integer arithmetic inside the database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Human-readable name (e.g. "Groceries", "Holiday")
    pub name: String,
    /// Planned amount in cents
    pub planned_cents: i64,
    /// Sum of all live expense amounts in cents, maintained by the ledger
    pub spent_cents: i64,
    /// Free-text period label (e.g. "Monthly")
    pub period: String,
    /// Start of the budget period
    pub start_date: DateTimeUtc,
    /// End of the budget period
    pub end_date: DateTimeUtc,
    /// Free-text description
    pub description: String,
    /// Inactive budgets are hidden from the active list but keep their data
    pub is_active: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// One budget has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
