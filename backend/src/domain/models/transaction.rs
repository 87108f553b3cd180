//! Domain model for a ledger transaction.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category used when a transaction is saved without one
pub const DEFAULT_CATEGORY: &str = "Others";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// `None` when the stored date could not be parsed
    pub date: Option<NaiveDate>,
    pub category: String,
    pub note: String,
    /// Signed amount: non-negative is income, negative is expense
    pub amount: f64,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        if self.amount >= 0.0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type() == TransactionType::Income
    }

    /// Generate a unique transaction ID based on amount and current timestamp.
    /// Format: <type>-<timestamp_ms>-<random_suffix>
    /// Example: ex-1709251200123-9f1c2a7b
    pub fn generate_id(amount: f64, timestamp_ms: u64) -> String {
        let tx_type = if amount >= 0.0 { "in" } else { "ex" };
        let random_suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        format!("{}-{}-{}", tx_type, timestamp_ms, random_suffix)
    }

    /// Id given to rows of a ledger file written before ids were stored
    pub fn legacy_id(position: usize) -> String {
        format!("legacy-{}", position)
    }

    /// Parse a stored date cell.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (as written by spreadsheet tools)
    /// and RFC 3339. Anything else yields `None`.
    pub fn parse_date(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Some(date_time.date());
        }
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
            return Some(date_time.date());
        }
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|date_time| date_time.date_naive())
    }

    pub fn format_date(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
