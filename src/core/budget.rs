//! Budget business logic - Handles all budget-related operations.
//!
//! Provides functions for creating, retrieving, updating, and deleting budgets.
//! The spent amount is never written here directly; it belongs to the ledger.

use crate::{
    core::expense,
    entities::{Budget, User, budget},
    errors::{Error, Result},
    models::{self, BudgetUpdate, NewBudget},
    money,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

fn validate_fields(name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("name", "Budget name cannot be empty"));
    }
    if end < start {
        return Err(Error::invalid_input(
            "end_date",
            "Budget cannot end before it starts",
        ));
    }
    Ok(())
}

/// Creates a new budget for a user, performing input validation.
///
/// The budget starts active with nothing spent.
#[instrument(skip(db, new_budget), fields(user_id = new_budget.user_id))]
pub async fn create_budget(db: &DatabaseConnection, new_budget: NewBudget) -> Result<models::Budget> {
    validate_fields(&new_budget.name, new_budget.start_date, new_budget.end_date)?;
    let planned_cents = money::non_negative_cents(new_budget.planned_amount)?;

    User::find_by_id(new_budget.user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", new_budget.user_id))?;

    let budget = budget::ActiveModel {
        user_id: Set(new_budget.user_id),
        name: Set(new_budget.name.trim().to_string()),
        planned_cents: Set(planned_cents),
        spent_cents: Set(0),
        period: Set(new_budget.period),
        start_date: Set(new_budget.start_date),
        end_date: Set(new_budget.end_date),
        description: Set(new_budget.description),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = budget.insert(db).await?;
    info!(budget_id = result.id, "Budget created");
    Ok(result.into())
}

/// Finds a budget by its unique ID.
pub async fn get_budget_by_id<C>(db: &C, budget_id: i64) -> Result<Option<models::Budget>>
where
    C: ConnectionTrait,
{
    Ok(Budget::find_by_id(budget_id).one(db).await?.map(Into::into))
}

/// Retrieves the user's active budgets, newest first.
pub async fn get_active_budgets_by_user<C>(db: &C, user_id: i64) -> Result<Vec<models::Budget>>
where
    C: ConnectionTrait,
{
    let budgets = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::IsActive.eq(true))
        .order_by_desc(budget::Column::CreatedAt)
        .order_by_desc(budget::Column::Id)
        .all(db)
        .await?;

    Ok(budgets.into_iter().map(Into::into).collect())
}

/// Retrieves all of the user's budgets, active or not, newest first.
pub async fn get_budgets_by_user<C>(db: &C, user_id: i64) -> Result<Vec<models::Budget>>
where
    C: ConnectionTrait,
{
    let budgets = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_desc(budget::Column::CreatedAt)
        .order_by_desc(budget::Column::Id)
        .all(db)
        .await?;

    Ok(budgets.into_iter().map(Into::into).collect())
}

/// Replaces the editable fields of a budget.
///
/// The planned amount may not drop below what has already been spent; that
/// check and the write happen in one transaction so a concurrent expense
/// cannot slip in between.
#[instrument(skip(db, changes))]
pub async fn update_budget(
    db: &DatabaseConnection,
    budget_id: i64,
    changes: BudgetUpdate,
) -> Result<models::Budget> {
    validate_fields(&changes.name, changes.start_date, changes.end_date)?;
    let planned_cents = money::non_negative_cents(changes.planned_amount)?;

    let txn = db.begin().await?;

    let existing = Budget::find_by_id(budget_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    if planned_cents < existing.spent_cents {
        return Err(Error::PlannedBelowSpent {
            planned: changes.planned_amount,
            spent: money::from_cents(existing.spent_cents),
        });
    }

    let mut active: budget::ActiveModel = existing.into();
    active.name = Set(changes.name.trim().to_string());
    active.planned_cents = Set(planned_cents);
    active.period = Set(changes.period);
    active.start_date = Set(changes.start_date);
    active.end_date = Set(changes.end_date);
    active.description = Set(changes.description);
    active.is_active = Set(changes.is_active);
    let saved = active.update(&txn).await?;

    txn.commit().await?;
    Ok(saved.into())
}

/// Marks a budget active or inactive without touching anything else.
pub async fn set_budget_active(
    db: &DatabaseConnection,
    budget_id: i64,
    is_active: bool,
) -> Result<models::Budget> {
    let existing = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    let mut active: budget::ActiveModel = existing.into();
    active.is_active = Set(is_active);
    Ok(active.update(db).await?.into())
}

/// Deletes a budget together with all of its expenses.
///
/// Expenses are removed explicitly rather than relying on the store's
/// cascading foreign key, which `SQLite` only honours when enabled.
#[instrument(skip(db))]
pub async fn delete_budget(db: &DatabaseConnection, budget_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Budget::find_by_id(budget_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    let removed = expense::delete_all_for_budget(&txn, budget_id).await?;
    existing.delete(&txn).await?;

    txn.commit().await?;

    info!(expenses_removed = removed, "Budget deleted");
    Ok(())
}
