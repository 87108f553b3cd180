use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single ledger entry as exchanged with the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier, used for deletion
    pub id: String,
    /// Calendar date of the entry; `None` when the stored date could not be parsed
    pub date: Option<NaiveDate>,
    pub category: String,
    pub note: String,
    /// Signed amount (non-negative for income, negative for expense)
    pub amount: f64,
    /// Derived from the sign of `amount` for rendering purposes
    pub transaction_type: TransactionType,
}

/// Type of transaction for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

/// A transaction to append. The date defaults to today when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub note: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendTransactionsRequest {
    pub transactions: Vec<NewTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendTransactionsResponse {
    /// The stored entries, with their generated ids and resolved dates
    pub transactions: Vec<Transaction>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    pub deleted: bool,
    pub success_message: String,
}

/// Income and expense of one category over the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub income: f64,
    pub expense: f64,
}

/// Headline numbers shown on the home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummaryResponse {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub formatted_expense: String,
    pub formatted_balance: String,
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by login and session refresh. `token` must be sent back as a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
    pub is_premium: bool,
    pub status_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `user_exists`
    pub reason: String,
    /// Short localized message suitable for a modal dialog
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Aggregates backing the monthly report and its charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReportResponse {
    pub username: String,
    pub period: String,
    pub monthly_total: f64,
    pub weekly_total: f64,
    pub categories: Vec<CategoryTotal>,
    pub daily: Vec<DailyTotal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportReportRequest {
    /// File name inside the user's report directory; a per-month default when omitted
    #[serde(default)]
    pub file_name: Option<String>,
    /// Display currency code such as `USD`; `Rp` when omitted
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportResponse {
    pub path: String,
    pub success_message: String,
}

/// Subscription tier offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub amount: u64,
    pub redirect_url: String,
    /// Public Snap key for embedding the payment popup
    pub client_key: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpgradeRequest {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeResponse {
    pub snap_url: String,
}

/// Payment notification posted by the gateway. Fields other than these are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub lang: String,
    pub key: String,
    pub text: String,
}
