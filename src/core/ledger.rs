//! Budget ledger - keeps each budget's spent amount equal to the sum of its expenses.
//!
//! Every change to an expense amount reaches the budget through
//! [`record_amount_delta`], which is applied as a single SQL update
//! (`spent_cents = spent_cents + delta`) against the persisted value. Callers
//! run it inside the same database transaction as the expense write, so the
//! pair commits or rolls back together. [`recompute`] is the repair path for
//! budgets whose stored total has drifted.

use crate::{
    entities::{Budget, Expense, budget, expense},
    errors::{Error, Result},
    models, money,
};
use rust_decimal::Decimal;
use sea_orm::{QuerySelect, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Adds a signed amount to a budget's spent total and returns the updated budget.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `budget_id` - Budget to adjust
/// * `delta` - Signed change (+amount on create, -amount on delete, new-old on update)
#[instrument(skip(db))]
pub async fn record_amount_delta<C>(db: &C, budget_id: i64, delta: Decimal) -> Result<models::Budget>
where
    C: ConnectionTrait,
{
    let delta_cents = money::to_cents(delta)?;

    Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    Budget::update_many()
        .col_expr(
            budget::Column::SpentCents,
            Expr::col(budget::Column::SpentCents).add(delta_cents),
        )
        .filter(budget::Column::Id.eq(budget_id))
        .exec(db)
        .await?;

    let updated = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    debug!(spent_cents = updated.spent_cents, "Applied ledger delta");
    Ok(updated.into())
}

/// Sums the amounts of all live expenses for a budget, in cents.
pub async fn sum_expense_cents<C>(db: &C, budget_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = Expense::find()
        .select_only()
        .column_as(Expr::col(expense::Column::AmountCents).sum(), "total")
        .filter(expense::Column::BudgetId.eq(budget_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Overwrites a budget's spent amount with the exact sum of its expenses.
///
/// Idempotent: on a correctly maintained ledger this changes nothing.
#[instrument(skip(db))]
pub async fn recompute<C>(db: &C, budget_id: i64) -> Result<models::Budget>
where
    C: ConnectionTrait,
{
    let current = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    let actual_cents = sum_expense_cents(db, budget_id).await?;

    if current.spent_cents != actual_cents {
        warn!(
            stored = current.spent_cents,
            actual = actual_cents,
            "Budget spent amount drifted, repairing"
        );
        Budget::update_many()
            .col_expr(budget::Column::SpentCents, Expr::value(actual_cents))
            .filter(budget::Column::Id.eq(budget_id))
            .exec(db)
            .await?;
    }

    let mut repaired = current;
    repaired.spent_cents = actual_cents;
    Ok(repaired.into())
}

/// Recomputes every budget in the store, each in its own transaction.
///
/// Returns the number of budgets whose stored spent amount had drifted.
pub async fn recompute_all(db: &DatabaseConnection) -> Result<usize> {
    let budgets = Budget::find().all(db).await?;
    let mut repaired = 0;

    for stored in &budgets {
        let txn = db.begin().await?;
        let budget = recompute(&txn, stored.id).await?;
        txn.commit().await?;

        if money::from_cents(stored.spent_cents) != budget.spent_amount {
            repaired += 1;
        }
    }

    info!(
        checked = budgets.len(),
        repaired, "Ledger reconciliation finished"
    );
    Ok(repaired)
}

/// Total spent across every budget the user owns.
///
/// Returns `None` when the user has no budgets.
pub async fn get_total_spent<C>(db: &C, user_id: i64) -> Result<Option<Decimal>>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = Budget::find()
        .select_only()
        .column_as(Expr::col(budget::Column::SpentCents).sum(), "total")
        .filter(budget::Column::UserId.eq(user_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().map(money::from_cents))
}
