//! Income, expense and balance totals for a ledger.
//!
//! Amounts are signed: non-negative entries count as income, negative ones as
//! expense. The expense total is reported as a positive magnitude, so
//! `balance == total_income - total_expense` always holds.

use std::collections::BTreeMap;

use crate::domain::errors::{FinanceError, FinanceResult};
use crate::domain::models::report::{CategoryBreakdown, LedgerSummary};
use crate::domain::models::transaction::{Transaction, DEFAULT_CATEGORY};

/// Prefix used when no currency is chosen
pub const DEFAULT_CURRENCY: &str = "Rp";

/// Currency codes a user may pick for display
pub const CURRENCIES: &[&str] = &[
    "IDR", "USD", "AUD", "BRL", "EUR", "AED", "GBP", "JPY", "CAD", "CHF", "NZD", "SGD", "HKD",
    "SEK", "NOK", "DKK", "INR", "CNY",
];

/// Service responsible for ledger totals and money formatting
#[derive(Clone, Default)]
pub struct BalanceService;

impl BalanceService {
    pub fn new() -> Self {
        Self
    }

    /// Totals plus per-category income and expense, categories sorted by name
    pub fn summarize(&self, transactions: &[Transaction]) -> LedgerSummary {
        let mut total_income = 0.0;
        let mut total_expense = 0.0;
        let mut by_category: BTreeMap<String, (f64, f64)> = BTreeMap::new();

        for transaction in transactions {
            let entry = by_category
                .entry(Self::category_of(transaction).to_string())
                .or_insert((0.0, 0.0));
            if transaction.is_income() {
                total_income += transaction.amount;
                entry.0 += transaction.amount;
            } else {
                total_expense -= transaction.amount;
                entry.1 -= transaction.amount;
            }
        }

        LedgerSummary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            categories: by_category
                .into_iter()
                .map(|(category, (income, expense))| CategoryBreakdown {
                    category,
                    income,
                    expense,
                })
                .collect(),
        }
    }

    /// Blank categories (e.g. from older files) are grouped under `Others`
    pub fn category_of(transaction: &Transaction) -> &str {
        let category = transaction.category.trim();
        if category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            category
        }
    }

    /// Format an amount as rupiah with thousands separators: `Rp 1,234.50`
    pub fn format_money(amount: f64) -> String {
        Self::format_money_in(amount, DEFAULT_CURRENCY)
    }

    /// Same layout with any currency prefix: `USD 1,234.50`
    pub fn format_money_in(amount: f64, currency: &str) -> String {
        let formatted = format!("{:.2}", amount.abs());
        let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let negative = amount < 0.0 && formatted != "0.00";
        format!("{} {}{}.{}", currency, if negative { "-" } else { "" }, grouped, fraction)
    }

    /// Currency prefix for a request: the default when none is given
    pub fn resolve_currency(requested: Option<&str>) -> FinanceResult<&'static str> {
        match requested.map(str::trim).filter(|code| !code.is_empty()) {
            None => Ok(DEFAULT_CURRENCY),
            Some(code) => Self::supported_currency(code)
                .ok_or_else(|| FinanceError::InvalidInput(format!("unknown currency {}", code))),
        }
    }

    /// Canonical display code for a selectable currency, case-insensitive
    pub fn supported_currency(code: &str) -> Option<&'static str> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(DEFAULT_CURRENCY) {
            return Some(DEFAULT_CURRENCY);
        }
        CURRENCIES
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn tx(category: &str, amount: f64) -> Transaction {
        Transaction {
            id: Transaction::generate_id(amount, 0),
            date: None,
            category: category.to_string(),
            note: String::new(),
            amount,
        }
    }

    #[test]
    fn test_summary_totals() {
        let service = BalanceService::new();
        let summary = service.summarize(&[
            tx("Salary", 100000.0),
            tx("Food", -25000.0),
            tx("Food", -5000.0),
        ]);

        assert_eq!(summary.total_income, 100000.0);
        assert_eq!(summary.total_expense, 30000.0);
        assert_eq!(summary.balance, 70000.0);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, "Food");
        assert_eq!(summary.categories[0].expense, 30000.0);
        assert_eq!(summary.categories[1].category, "Salary");
        assert_eq!(summary.categories[1].income, 100000.0);
    }

    #[test]
    fn test_empty_ledger_summary() {
        let summary = BalanceService::new().summarize(&[]);
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_blank_category_grouped_as_others() {
        let summary = BalanceService::new().summarize(&[tx("", -1.0), tx(" ", -2.0)]);
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].category, DEFAULT_CATEGORY);
        assert_eq!(summary.categories[0].expense, 3.0);
    }

    #[test]
    fn test_balance_identity_on_random_ledgers() {
        let service = BalanceService::new();
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let len = rng.gen_range(0..40);
            let transactions: Vec<Transaction> = (0..len)
                .map(|_| {
                    let cents: i64 = rng.gen_range(-1_000_000..1_000_000);
                    tx("Random", cents as f64 / 100.0)
                })
                .collect();

            let summary = service.summarize(&transactions);
            let income: f64 = transactions
                .iter()
                .filter(|t| t.amount >= 0.0)
                .map(|t| t.amount)
                .sum();
            let expense: f64 = -transactions
                .iter()
                .filter(|t| t.amount < 0.0)
                .map(|t| t.amount)
                .sum::<f64>();

            assert!((summary.total_income - income).abs() < 1e-6);
            assert!((summary.total_expense - expense).abs() < 1e-6);
            assert!(summary.total_income >= 0.0);
            assert!(summary.total_expense >= 0.0);
            let identity = summary.total_income - summary.total_expense;
            assert!((summary.balance - identity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(BalanceService::format_money(0.0), "Rp 0.00");
        assert_eq!(BalanceService::format_money(1234.5), "Rp 1,234.50");
        assert_eq!(BalanceService::format_money(15000.0), "Rp 15,000.00");
        assert_eq!(BalanceService::format_money(1234567.891), "Rp 1,234,567.89");
        assert_eq!(BalanceService::format_money(-70000.0), "Rp -70,000.00");
        assert_eq!(BalanceService::format_money(-0.001), "Rp 0.00");
    }

    #[test]
    fn test_format_money_in_chosen_currency() {
        assert_eq!(BalanceService::format_money_in(1234.5, "USD"), "USD 1,234.50");
        assert_eq!(BalanceService::format_money_in(-50.0, "EUR"), "EUR -50.00");
    }

    #[test]
    fn test_supported_currency() {
        assert_eq!(BalanceService::supported_currency("usd"), Some("USD"));
        assert_eq!(BalanceService::supported_currency(" IDR "), Some("IDR"));
        assert_eq!(BalanceService::supported_currency("rp"), Some("Rp"));
        assert_eq!(BalanceService::supported_currency("XYZ"), None);
    }

    #[test]
    fn test_resolve_currency() {
        assert_eq!(BalanceService::resolve_currency(None).unwrap(), "Rp");
        assert_eq!(BalanceService::resolve_currency(Some("")).unwrap(), "Rp");
        assert_eq!(BalanceService::resolve_currency(Some("jpy")).unwrap(), "JPY");
        assert!(matches!(
            BalanceService::resolve_currency(Some("XYZ")),
            Err(FinanceError::InvalidInput(_))
        ));
    }
}
