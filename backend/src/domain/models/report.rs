//! Domain models for aggregated reports.
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Per-category income and expense over a whole ledger
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category: String,
    pub income: f64,
    pub expense: f64,
}

/// Headline totals of a ledger. `balance == total_income - total_expense`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub categories: Vec<CategoryBreakdown>,
}

/// Aggregates for the current calendar month, computed relative to `generated_at`
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub username: String,
    pub generated_at: NaiveDateTime,
    pub monthly_total: f64,
    /// Sum over entries dated within the trailing 7 days; 0 when there are none
    pub weekly_total: f64,
    /// Sorted by category name
    pub categories: Vec<CategoryTotal>,
    /// Sorted by day
    pub daily: Vec<DailyTotal>,
}

impl MonthlyReport {
    /// e.g. "March 2024"
    pub fn period_label(&self) -> String {
        self.generated_at.format("%B %Y").to_string()
    }
}
