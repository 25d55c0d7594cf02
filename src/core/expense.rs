//! Expense business logic - Handles all expense-related operations.
//!
//! Each mutation (create, update, delete) writes the expense row and applies
//! exactly one compensating delta to the owning budget through the ledger. Both
//! writes run in one database transaction, so either the whole unit commits or
//! nothing does. Validation happens before the store is touched.

use crate::{
    core::ledger,
    entities::{Budget, Expense, budget, expense},
    errors::{Error, Result},
    models::{self, DEFAULT_CATEGORY, NewExpense},
    money,
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("name", "Expense name cannot be empty"));
    }
    Ok(())
}

/// Records a new expense and adds its amount to the budget's spent total.
///
/// Fails with `InvalidAmount` when the amount is not positive, `InvalidInput`
/// when the name is blank and `NotFound` when the budget does not exist. In
/// every failure case no expense row is written.
#[instrument(skip(db, new_expense), fields(budget_id = new_expense.budget_id))]
pub async fn create_expense(
    db: &DatabaseConnection,
    new_expense: NewExpense,
) -> Result<models::Expense> {
    validate_name(&new_expense.name)?;
    let amount_cents = money::positive_cents(new_expense.amount)?;
    let category = models::resolve_category(new_expense.category.as_deref(), DEFAULT_CATEGORY);

    let txn = db.begin().await?;

    Budget::find_by_id(new_expense.budget_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("budget", new_expense.budget_id))?;

    let expense_model = expense::ActiveModel {
        budget_id: Set(new_expense.budget_id),
        name: Set(new_expense.name.trim().to_string()),
        amount_cents: Set(amount_cents),
        date: Set(new_expense.date),
        note: Set(new_expense.note),
        category: Set(category),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = expense_model.insert(&txn).await?;

    ledger::record_amount_delta(&txn, new_expense.budget_id, new_expense.amount).await?;

    txn.commit().await?;

    info!(expense_id = inserted.id, "Expense recorded");
    Ok(inserted.into())
}

/// Persists an edited expense and applies `amount_delta` to its budget.
///
/// The caller states the signed change in amount. It is checked against the
/// persisted row (`updated.amount - previous amount`) and the budget it
/// belongs to; a mismatch fails with `InvalidInput` before anything is written.
/// A `budget_id` naming no budget at all fails with `NotFound`.
#[instrument(skip(db, updated), fields(expense_id = updated.id))]
pub async fn update_expense(
    db: &DatabaseConnection,
    updated: &models::Expense,
    budget_id: i64,
    amount_delta: Decimal,
) -> Result<models::Expense> {
    validate_name(&updated.name)?;
    let new_cents = money::positive_cents(updated.amount)?;
    let delta_cents = money::to_cents(amount_delta)?;

    let txn = db.begin().await?;

    let existing = Expense::find_by_id(updated.id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("expense", updated.id))?;

    if existing.budget_id != budget_id || updated.budget_id != budget_id {
        Budget::find_by_id(budget_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("budget", budget_id))?;

        return Err(Error::invalid_input(
            "budget_id",
            format!(
                "Expense {} belongs to budget {}, not {}",
                existing.id, existing.budget_id, budget_id
            ),
        ));
    }

    let expected_cents = new_cents - existing.amount_cents;
    if expected_cents != delta_cents {
        return Err(Error::invalid_input(
            "amount_delta",
            format!(
                "Delta {} does not match the amount change {}",
                amount_delta,
                money::from_cents(expected_cents)
            ),
        ));
    }

    let mut active: expense::ActiveModel = existing.into();
    active.name = Set(updated.name.trim().to_string());
    active.amount_cents = Set(new_cents);
    active.date = Set(updated.date);
    active.note = Set(updated.note.clone());
    active.category = Set(models::resolve_category(
        Some(&updated.category),
        DEFAULT_CATEGORY,
    ));
    let saved = active.update(&txn).await?;

    if delta_cents != 0 {
        ledger::record_amount_delta(&txn, budget_id, amount_delta).await?;
    }

    txn.commit().await?;

    Ok(saved.into())
}

/// Deletes an expense and subtracts its amount from the budget.
///
/// The persisted amount is used, never a caller-supplied one. Deleting the same
/// expense twice fails with `NotFound` the second time, so the budget is
/// decremented only once. Returns the removed expense.
#[instrument(skip(db))]
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<models::Expense> {
    let txn = db.begin().await?;

    let existing = Expense::find_by_id(expense_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("expense", expense_id))?;

    let removed = models::Expense::from(existing.clone());
    existing.delete(&txn).await?;

    ledger::record_amount_delta(&txn, removed.budget_id, -removed.amount).await?;

    txn.commit().await?;

    info!(budget_id = removed.budget_id, "Expense deleted");
    Ok(removed)
}

/// Removes every expense of a budget and resets its spent total to zero.
///
/// Used when the budget itself is being deleted; the reset keeps the ledger
/// consistent if the budget row survives. Returns the number of expenses removed.
pub async fn delete_all_for_budget<C>(db: &C, budget_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let deleted = Expense::delete_many()
        .filter(expense::Column::BudgetId.eq(budget_id))
        .exec(db)
        .await?;

    Budget::update_many()
        .col_expr(budget::Column::SpentCents, Expr::value(0_i64))
        .filter(budget::Column::Id.eq(budget_id))
        .exec(db)
        .await?;

    Ok(deleted.rows_affected)
}

/// Retrieves a specific expense by its unique ID.
pub async fn get_expense_by_id<C>(db: &C, expense_id: i64) -> Result<Option<models::Expense>>
where
    C: ConnectionTrait,
{
    Ok(Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .map(Into::into))
}

/// Retrieves all expenses for a budget, newest first.
pub async fn get_expenses_by_budget<C>(db: &C, budget_id: i64) -> Result<Vec<models::Expense>>
where
    C: ConnectionTrait,
{
    let expenses = Expense::find()
        .filter(expense::Column::BudgetId.eq(budget_id))
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::Id)
        .all(db)
        .await?;

    Ok(expenses.into_iter().map(Into::into).collect())
}

/// Retrieves the user's most recent expenses across all of their budgets.
pub async fn get_recent_expenses_by_user<C>(
    db: &C,
    user_id: i64,
    limit: u64,
) -> Result<Vec<models::Expense>>
where
    C: ConnectionTrait,
{
    let expenses = Expense::find()
        .inner_join(Budget)
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(expenses.into_iter().map(Into::into).collect())
}

/// Retrieves every expense the user has recorded, oldest first.
pub async fn get_expenses_by_user<C>(db: &C, user_id: i64) -> Result<Vec<models::Expense>>
where
    C: ConnectionTrait,
{
    let expenses = Expense::find()
        .inner_join(Budget)
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_asc(expense::Column::Date)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await?;

    Ok(expenses.into_iter().map(Into::into).collect())
}
