//! Domain models for premium payments.
use serde::{Deserialize, Serialize};

/// Prefix of order ids created by the server-side upgrade flow
pub const PREMIUM_ORDER_PREFIX: &str = "premium-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Weekly,
    Monthly,
}

impl Plan {
    pub fn name(&self) -> &'static str {
        match self {
            Plan::Weekly => "weekly",
            Plan::Monthly => "monthly",
        }
    }

    /// Order id for a client checkout: `<plan>-<unix seconds>`
    pub fn order_id(&self, unix_seconds: i64) -> String {
        format!("{}-{}", self.name(), unix_seconds)
    }
}

/// Order id for the server-side upgrade flow: `premium-<username>`
pub fn premium_order_id(username: &str) -> String {
    format!("{}{}", PREMIUM_ORDER_PREFIX, username)
}

/// Recover the username from a `premium-<username>` order id
pub fn username_from_order_id(order_id: &str) -> Option<&str> {
    order_id
        .strip_prefix(PREMIUM_ORDER_PREFIX)
        .filter(|username| !username.trim().is_empty())
}

/// A line item sent to the payment gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: u64,
    pub quantity: u32,
    pub name: String,
}

/// Everything the gateway needs to open a payment page
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOrder {
    pub order_id: String,
    pub gross_amount: u64,
    pub items: Vec<ItemDetail>,
    /// Shown to the payer as the customer's first name
    pub customer_name: Option<String>,
    pub enabled_payments: Vec<String>,
    pub expiry_minutes: Option<u32>,
}

/// Asynchronous payment notification from the gateway
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentNotification {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
    pub fraud_status: Option<String>,
}

impl PaymentNotification {
    /// A captured, fraud-accepted payment
    pub fn is_successful_capture(&self) -> bool {
        self.transaction_status.as_deref() == Some("capture")
            && self.fraud_status.as_deref() == Some("accept")
    }
}

/// What handling a notification did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The user's premium flag is now set (also on replays)
    Upgraded { username: String },
    /// Not a successful capture; nothing changed
    Pending,
    /// Successful capture whose order id does not name a user
    UnresolvableOrder,
    /// Successful capture for a username that is not registered
    UnknownUser { username: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order_id() {
        assert_eq!(Plan::Weekly.order_id(1_700_000_000), "weekly-1700000000");
        assert_eq!(Plan::Monthly.order_id(5), "monthly-5");
    }

    #[test]
    fn test_username_round_trips_through_order_id() {
        assert_eq!(username_from_order_id(&premium_order_id("alice")), Some("alice"));
        assert_eq!(username_from_order_id("premium-a-b"), Some("a-b"));
    }

    #[test]
    fn test_unresolvable_order_ids() {
        assert_eq!(username_from_order_id("weekly-1700000000"), None);
        assert_eq!(username_from_order_id("premium-"), None);
        assert_eq!(username_from_order_id(""), None);
    }

    #[test]
    fn test_successful_capture_requires_both_fields() {
        let mut notification = PaymentNotification {
            order_id: Some("premium-alice".into()),
            transaction_status: Some("capture".into()),
            fraud_status: Some("accept".into()),
        };
        assert!(notification.is_successful_capture());
        notification.fraud_status = Some("challenge".into());
        assert!(!notification.is_successful_capture());
        notification.fraud_status = Some("accept".into());
        notification.transaction_status = Some("settlement".into());
        assert!(!notification.is_successful_capture());
        notification.transaction_status = None;
        assert!(!notification.is_successful_capture());
    }
}
