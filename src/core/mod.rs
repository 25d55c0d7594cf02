//! Core business logic - framework-agnostic user, budget, expense, ledger and
//! statistics operations. Every function takes the database handle explicitly.

/// Budget CRUD
pub mod budget;
/// Expense mutations and queries, each paired with a ledger delta
pub mod expense;
/// Spent-amount bookkeeping and repair
pub mod ledger;
/// Planned-versus-spent report for one budget
pub mod report;
/// Pure aggregations over expense snapshots
pub mod statistics;
/// Registration, login and password reset
pub mod user;
