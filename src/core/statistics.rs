//! Spending statistics - pure aggregations over a snapshot of expenses.
//!
//! Nothing here touches the database; callers fetch the expenses first and
//! pass them in. Averages and percentages are rounded to two decimal places,
//! midpoint away from zero.

use crate::models::Expense;
use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of categories shown in the "top categories" view by default.
pub const DEFAULT_TOP_CATEGORIES: usize = 5;

const DISPLAY_SCALE: u32 = 2;

/// Totals for one category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// Category label as stored on the expenses
    pub category: String,
    /// Sum of the amounts in this category
    pub total: Decimal,
    /// Number of expenses in this category
    pub count: usize,
    /// Share of the grand total, 0-100
    pub percentage: Decimal,
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    /// Month the expenses fall in
    pub month: YearMonth,
    /// Sum of amounts
    pub total: Decimal,
    /// Number of expenses
    pub count: usize,
}

/// Everything the statistics view shows, computed in one pass per grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsSummary {
    /// Sum of amounts
    pub total: Decimal,
    /// Mean amount, 0 for no expenses
    pub average: Decimal,
    /// Number of expenses summarized
    pub expense_count: usize,
    /// All categories, alphabetical
    pub by_category: Vec<CategoryTotal>,
    /// All months, oldest first
    pub by_month: Vec<MonthTotal>,
    /// Largest categories by total, descending
    pub top_categories: Vec<CategoryTotal>,
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of all expense amounts.
#[must_use]
pub fn total_spent(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Mean expense amount; zero for an empty snapshot.
#[must_use]
pub fn average_spent(expenses: &[Expense]) -> Decimal {
    if expenses.is_empty() {
        return Decimal::ZERO;
    }
    round(total_spent(expenses) / Decimal::from(expenses.len()))
}

/// `part / whole * 100`, defined as zero when `whole` is zero.
#[must_use]
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round(part / whole * Decimal::ONE_HUNDRED)
}

/// Partitions expenses by category label, sorted alphabetically.
#[must_use]
pub fn group_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let grand_total = total_spent(expenses);
    let mut groups: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();

    for expense in expenses {
        let entry = groups
            .entry(expense.category.as_str())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
            percentage: percentage_of(total, grand_total),
        })
        .collect()
}

/// Partitions expenses by the calendar month of their date, oldest first.
#[must_use]
pub fn group_by_month(expenses: &[Expense]) -> Vec<MonthTotal> {
    let mut groups: BTreeMap<YearMonth, (Decimal, usize)> = BTreeMap::new();

    for expense in expenses {
        let key = YearMonth {
            year: expense.date.year(),
            month: expense.date.month(),
        };
        let entry = groups.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(month, (total, count))| MonthTotal {
            month,
            total,
            count,
        })
        .collect()
}

/// The `n` categories with the largest totals, descending. Ties are broken
/// alphabetically.
#[must_use]
pub fn top_categories(expenses: &[Expense], n: usize) -> Vec<CategoryTotal> {
    rank_categories(group_by_category(expenses), n)
}

fn rank_categories(mut categories: Vec<CategoryTotal>, n: usize) -> Vec<CategoryTotal> {
    categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    categories.truncate(n);
    categories
}

/// Computes the full statistics view for a snapshot.
#[must_use]
pub fn summarize(expenses: &[Expense], top_n: usize) -> StatisticsSummary {
    let by_category = group_by_category(expenses);
    let top = rank_categories(by_category.clone(), top_n);

    StatisticsSummary {
        total: total_spent(expenses),
        average: average_spent(expenses),
        expense_count: expenses.len(),
        by_category,
        by_month: group_by_month(expenses),
        top_categories: top,
    }
}
