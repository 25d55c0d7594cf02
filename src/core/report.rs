//! Budget report generation.
//!
//! This module builds the planned-versus-spent view for a single budget and
//! provides small text formatters for it. The report is plain data; rendering
//! is left to the caller.

use crate::{
    errors::{Error, Result},
    models::{Budget, Expense},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sea_orm::ConnectionTrait;

/// Default number of recent expenses included in a report.
pub const DEFAULT_REPORT_EXPENSES: u64 = 10;

/// Planned versus spent for one budget.
#[derive(Debug, Clone)]
pub struct BudgetReport {
    /// The budget being reported on
    pub budget: Budget,
    /// Planned amount
    pub planned: Decimal,
    /// Amount spent so far
    pub spent: Decimal,
    /// Planned minus spent; negative when overspent
    pub remaining: Decimal,
    /// Share of the planned amount already spent, can exceed 100
    pub percent_used: Decimal,
    /// Most recent expenses, newest first
    pub recent_expenses: Vec<Expense>,
}

/// Generates a report for a specific budget.
///
/// # Arguments
/// * `db` - Database connection
/// * `budget_id` - ID of the budget to report on
/// * `expense_limit` - Maximum number of recent expenses to include (default 10)
pub async fn generate_budget_report<C>(
    db: &C,
    budget_id: i64,
    expense_limit: Option<u64>,
) -> Result<BudgetReport>
where
    C: ConnectionTrait,
{
    let budget = crate::core::budget::get_budget_by_id(db, budget_id)
        .await?
        .ok_or_else(|| Error::not_found("budget", budget_id))?;

    let limit = usize::try_from(expense_limit.unwrap_or(DEFAULT_REPORT_EXPENSES))
        .unwrap_or(usize::MAX);
    let recent_expenses: Vec<Expense> =
        crate::core::expense::get_expenses_by_budget(db, budget_id)
            .await?
            .into_iter()
            .take(limit)
            .collect();

    let planned = budget.planned_amount;
    let spent = budget.spent_amount;

    Ok(BudgetReport {
        remaining: budget.remaining(),
        percent_used: calculate_percent_used(spent, planned),
        budget,
        planned,
        spent,
        recent_expenses,
    })
}

/// Calculates how much of the planned amount has been spent, as a percentage.
///
/// - 0% = nothing spent
/// - 100% = planned amount fully spent
/// - Above 100% indicates overspending
///
/// A zero planned amount reports 0% rather than dividing by zero.
#[must_use]
pub fn calculate_percent_used(spent: Decimal, planned: Decimal) -> Decimal {
    crate::core::statistics::percentage_of(spent, planned)
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `percent` - Progress percentage (clamped to 0-100 for the bar only)
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(percent: Decimal, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

    let filled = (clamped / Decimal::ONE_HUNDRED * Decimal::from(length))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_usize()
        .unwrap_or(0)
        .min(length);
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);
    let shown = percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    format!("[{filled_str}{empty_str}] {shown:.1}%")
}

/// Formats a monetary amount with two decimals, e.g. `$50.00` or `-$25.50`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount.abs())
    }
}

/// Generates a one-line summary of an expense.
#[must_use]
pub fn format_expense_summary(expense: &Expense) -> String {
    format!(
        "{} | {} | {}",
        format_amount(expense.amount),
        expense.category,
        expense.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_used() {
        assert_eq!(calculate_percent_used(dec!(0), dec!(100)), dec!(0));
        assert_eq!(calculate_percent_used(dec!(50), dec!(100)), dec!(50));
        assert_eq!(calculate_percent_used(dec!(125), dec!(100)), dec!(125));
        // Zero planned amount edge case
        assert_eq!(calculate_percent_used(dec!(50), dec!(0)), dec!(0));
    }

    #[test]
    fn test_format_progress_bar_full() {
        let bar = format_progress_bar(dec!(100), Some(10));
        assert_eq!(bar, "[██████████] 100.0%");
    }

    #[test]
    fn test_format_progress_bar_half() {
        let bar = format_progress_bar(dec!(50), Some(10));
        assert_eq!(bar, "[█████░░░░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_overspent() {
        // Overspending is clamped to a full bar
        let bar = format_progress_bar(dec!(140), Some(10));
        assert_eq!(bar, "[██████████] 140.0%");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(50)), "$50.00");
        assert_eq!(format_amount(dec!(123.456)), "$123.46");
        assert_eq!(format_amount(dec!(-25.5)), "-$25.50");
        assert_eq!(format_amount(Decimal::ZERO), "$0.00");
        // Midpoints round away from zero
        assert_eq!(format_amount(dec!(0.125)), "$0.13");
        assert_eq!(format_amount(dec!(-0.125)), "-$0.13");
        assert_eq!(format_amount(dec!(-0.001)), "$0.00");
    }

    #[tokio::test]
    async fn test_generate_budget_report_integration() -> Result<()> {
        let (db, _user, budget) = setup_with_budget().await?;

        create_test_expense(&db, budget.id, dec!(200)).await?;
        create_test_expense(&db, budget.id, dec!(50)).await?;

        let report = generate_budget_report(&db, budget.id, Some(5)).await?;

        assert_eq!(report.budget.id, budget.id);
        assert_eq!(report.planned, dec!(1000));
        assert_eq!(report.spent, dec!(250));
        assert_eq!(report.remaining, dec!(750));
        assert_eq!(report.percent_used, dec!(25));
        assert_eq!(report.recent_expenses.len(), 2);

        let summary = format_expense_summary(&report.recent_expenses[0]);
        assert!(summary.starts_with('$'));
        assert!(summary.ends_with("Test expense"));

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_budget_report_expense_limit() -> Result<()> {
        let (db, _user, budget) = setup_with_budget().await?;

        for _ in 0..15 {
            create_test_expense(&db, budget.id, dec!(1)).await?;
        }

        let report = generate_budget_report(&db, budget.id, Some(5)).await?;
        assert_eq!(report.recent_expenses.len(), 5);

        let report = generate_budget_report(&db, budget.id, None).await?;
        assert_eq!(report.recent_expenses.len(), 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_budget_report_missing_budget() -> Result<()> {
        let db = setup_test_db().await?;

        let result = generate_budget_report(&db, 77, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }
}
