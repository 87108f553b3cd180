//! Failure taxonomy for user-facing operations.
//!
//! Every variant maps to a stable reason code and a localization key, so the
//! REST layer can show a short translated message instead of a raw error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("username already exists")]
    UserExists,

    #[error("invalid username or password")]
    LoginFailed,

    #[error("no user is logged in")]
    NoSession,

    #[error("this feature requires a premium account")]
    PremiumRequired,

    #[error("there are no transactions")]
    NoData,

    #[error("there are no transactions this month")]
    NoDataThisMonth,

    #[error("transaction cannot be deleted")]
    CannotDelete,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Carries the payment provider's message verbatim
    #[error("{0}")]
    GatewayError(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl FinanceError {
    /// Stable machine-readable code
    pub fn reason_code(&self) -> &'static str {
        match self {
            FinanceError::UserExists => "user_exists",
            FinanceError::LoginFailed => "login_failed",
            FinanceError::NoSession => "no_user_logged_in",
            FinanceError::PremiumRequired => "premium_only",
            FinanceError::NoData => "no_transactions",
            FinanceError::NoDataThisMonth => "no_transactions_this_month",
            FinanceError::CannotDelete => "cannot_delete",
            FinanceError::UserNotFound => "user_not_found",
            FinanceError::InvalidInput(_) => "invalid_input",
            FinanceError::GatewayError(_) => "gateway_error",
            FinanceError::Storage(_) => "storage_error",
        }
    }

    /// Localization key of the user-facing message
    pub fn message_key(&self) -> &'static str {
        match self {
            FinanceError::PremiumRequired => "premium_feature_only",
            other => other.reason_code(),
        }
    }
}

pub type FinanceResult<T> = std::result::Result<T, FinanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_distinct() {
        let errors = [
            FinanceError::UserExists,
            FinanceError::LoginFailed,
            FinanceError::NoSession,
            FinanceError::PremiumRequired,
            FinanceError::NoData,
            FinanceError::NoDataThisMonth,
            FinanceError::CannotDelete,
            FinanceError::UserNotFound,
            FinanceError::InvalidInput("x".to_string()),
            FinanceError::GatewayError("x".to_string()),
            FinanceError::Storage(anyhow::anyhow!("x")),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.reason_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_gateway_message_is_verbatim() {
        let error =
            FinanceError::GatewayError("Access denied due to unauthorized transaction".into());
        assert_eq!(error.to_string(), "Access denied due to unauthorized transaction");
    }
}
