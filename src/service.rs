//! Presentation-facing use cases.
//!
//! [`BudgetService`] is assembled once at start-up from a database connection
//! and an [`AppConfig`]; there is no global container. Every mutation goes
//! through the core modules and, once committed, is announced on the
//! [`ChangeFeed`] so live subscriptions can refresh.

use crate::{
    config::AppConfig,
    core::{budget, expense, ledger, report, statistics, user},
    errors::{Error, Result},
    feed::{ChangeFeed, ChangeKind, StoreChange, Subscription, Table},
    models::{Budget, BudgetUpdate, Expense, NewBudget, NewExpense, NewUser, User},
};
use futures::FutureExt;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Entry point for every user-initiated command and query.
#[derive(Debug, Clone)]
pub struct BudgetService {
    db: Arc<DatabaseConnection>,
    config: AppConfig,
    feed: ChangeFeed,
}

impl BudgetService {
    /// Wires the service from its collaborators.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let feed = ChangeFeed::new(config.change_feed_capacity);
        Self {
            db: Arc::new(db),
            config,
            feed,
        }
    }

    /// The shared database connection.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Settings the service was built with.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bus every committed change is published on.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn publish(&self, table: Table, kind: ChangeKind, id: i64) {
        self.feed.publish(StoreChange::new(table, kind, id));
    }

    // Users

    /// Registers a user; a taken email fails with `Conflict`.
    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        let user = user::register_user(self.db(), new_user).await?;
        self.publish(Table::Users, ChangeKind::Inserted, user.id);
        Ok(user)
    }

    /// Checks credentials; any mismatch is `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        user::authenticate(self.db(), email, password).await
    }

    /// Replaces the password of the user with this email.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<()> {
        user::reset_password(self.db(), email, new_password).await
    }

    /// Looks up a user by id.
    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        user::get_user_by_id(self.db(), user_id).await
    }

    // Budgets

    /// Creates a budget for an existing user.
    pub async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        let budget = budget::create_budget(self.db(), new_budget).await?;
        self.publish(Table::Budgets, ChangeKind::Inserted, budget.id);
        Ok(budget)
    }

    /// Looks up a budget by id.
    pub async fn get_budget_by_id(&self, budget_id: i64) -> Result<Option<Budget>> {
        budget::get_budget_by_id(self.db(), budget_id).await
    }

    /// Every budget the user owns, active or not.
    pub async fn get_budgets_by_user(&self, user_id: i64) -> Result<Vec<Budget>> {
        budget::get_budgets_by_user(self.db(), user_id).await
    }

    /// Edits a budget. The planned amount cannot drop below the spent amount.
    pub async fn update_budget(&self, budget_id: i64, changes: BudgetUpdate) -> Result<Budget> {
        let budget = budget::update_budget(self.db(), budget_id, changes).await?;
        self.publish(Table::Budgets, ChangeKind::Updated, budget_id);
        Ok(budget)
    }

    /// Shows or hides a budget in the active list.
    pub async fn set_budget_active(&self, budget_id: i64, is_active: bool) -> Result<Budget> {
        let budget = budget::set_budget_active(self.db(), budget_id, is_active).await?;
        self.publish(Table::Budgets, ChangeKind::Updated, budget_id);
        Ok(budget)
    }

    /// Deletes a budget together with its expenses.
    pub async fn delete_budget(&self, budget_id: i64) -> Result<()> {
        budget::delete_budget(self.db(), budget_id).await?;
        self.publish(Table::Expenses, ChangeKind::Deleted, budget_id);
        self.publish(Table::Budgets, ChangeKind::Deleted, budget_id);
        Ok(())
    }

    /// Live list of the user's active budgets.
    #[must_use]
    pub fn subscribe_active_budgets(&self, user_id: i64) -> Subscription<Budget> {
        let db = Arc::clone(&self.db);
        Subscription::new(
            self.feed.subscribe(),
            &[Table::Budgets],
            Box::new(move || {
                let db = Arc::clone(&db);
                async move { budget::get_active_budgets_by_user(&*db, user_id).await }.boxed()
            }),
        )
    }

    // Expenses

    /// Records an expense. A missing category falls back to the configured default.
    pub async fn add_expense(&self, mut new_expense: NewExpense) -> Result<Expense> {
        new_expense.category = Some(crate::models::resolve_category(
            new_expense.category.as_deref(),
            &self.config.default_category,
        ));
        let expense = expense::create_expense(self.db(), new_expense).await?;
        self.publish(Table::Expenses, ChangeKind::Inserted, expense.id);
        self.publish(Table::Budgets, ChangeKind::Updated, expense.budget_id);
        Ok(expense)
    }

    /// Persists an edited expense and applies the caller's signed `amount_delta`
    /// to the budget in the same transaction. A blank category falls back to
    /// the configured default.
    pub async fn update_expense_and_budget_balance(
        &self,
        updated: &Expense,
        budget_id: i64,
        amount_delta: Decimal,
    ) -> Result<Expense> {
        let mut updated = updated.clone();
        updated.category = crate::models::resolve_category(
            Some(&updated.category),
            &self.config.default_category,
        );
        let expense =
            expense::update_expense(self.db(), &updated, budget_id, amount_delta).await?;
        self.publish(Table::Expenses, ChangeKind::Updated, expense.id);
        self.publish(Table::Budgets, ChangeKind::Updated, budget_id);
        Ok(expense)
    }

    /// Persists an edited expense, deriving the delta from the stored amount.
    pub async fn update_expense(&self, updated: &Expense) -> Result<Expense> {
        let previous = expense::get_expense_by_id(self.db(), updated.id)
            .await?
            .ok_or_else(|| Error::not_found("expense", updated.id))?;

        let amount_delta = updated
            .amount
            .checked_sub(previous.amount)
            .ok_or(Error::InvalidAmount {
                amount: updated.amount,
            })?;

        self.update_expense_and_budget_balance(updated, previous.budget_id, amount_delta)
            .await
    }

    /// Deletes an expense and subtracts it from its budget.
    pub async fn delete_expense(&self, expense_id: i64) -> Result<Expense> {
        let removed = expense::delete_expense(self.db(), expense_id).await?;
        self.publish(Table::Expenses, ChangeKind::Deleted, expense_id);
        self.publish(Table::Budgets, ChangeKind::Updated, removed.budget_id);
        Ok(removed)
    }

    /// Looks up an expense by id.
    pub async fn get_expense_by_id(&self, expense_id: i64) -> Result<Option<Expense>> {
        expense::get_expense_by_id(self.db(), expense_id).await
    }

    /// Live list of a budget's expenses, newest first.
    #[must_use]
    pub fn subscribe_expenses_by_budget(&self, budget_id: i64) -> Subscription<Expense> {
        let db = Arc::clone(&self.db);
        Subscription::new(
            self.feed.subscribe(),
            &[Table::Expenses],
            Box::new(move || {
                let db = Arc::clone(&db);
                async move { expense::get_expenses_by_budget(&*db, budget_id).await }.boxed()
            }),
        )
    }

    /// Live list of the user's most recent expenses across all budgets.
    /// A `None` limit uses the configured default.
    #[must_use]
    pub fn subscribe_recent_expenses(
        &self,
        user_id: i64,
        limit: Option<u64>,
    ) -> Subscription<Expense> {
        let db = Arc::clone(&self.db);
        let limit = limit.unwrap_or(self.config.recent_expenses_limit);
        Subscription::new(
            self.feed.subscribe(),
            &[Table::Expenses, Table::Budgets],
            Box::new(move || {
                let db = Arc::clone(&db);
                async move { expense::get_recent_expenses_by_user(&*db, user_id, limit).await }
                    .boxed()
            }),
        )
    }

    // Ledger, statistics and reports

    /// Spent total across the user's budgets; `None` without budgets.
    pub async fn total_spent(&self, user_id: i64) -> Result<Option<Decimal>> {
        ledger::get_total_spent(self.db(), user_id).await
    }

    /// Repairs a budget's spent amount from its expenses.
    pub async fn recompute_budget(&self, budget_id: i64) -> Result<Budget> {
        let budget = ledger::recompute(self.db(), budget_id).await?;
        self.publish(Table::Budgets, ChangeKind::Updated, budget_id);
        Ok(budget)
    }

    /// Statistics over every expense the user has recorded.
    pub async fn statistics_for_user(&self, user_id: i64) -> Result<statistics::StatisticsSummary> {
        let expenses = expense::get_expenses_by_user(self.db(), user_id).await?;
        Ok(statistics::summarize(&expenses, self.config.top_categories))
    }

    /// Planned versus spent report for one budget.
    pub async fn budget_report(&self, budget_id: i64) -> Result<report::BudgetReport> {
        report::generate_budget_report(
            self.db(),
            budget_id,
            Some(self.config.recent_expenses_limit),
        )
        .await
    }
}
