//! Premium payments: client checkout, server-side upgrade and the gateway webhook.
//!
//! The payment flow is fire-and-forget. Opening a payment page never changes the
//! premium flag; only a successful-capture notification does, and replaying
//! one is harmless.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::auth_service::AuthService;
use crate::domain::commands::payments::{CheckoutCommand, CheckoutResult};
use crate::domain::errors::{FinanceError, FinanceResult};
use crate::domain::models::payment::{
    premium_order_id, username_from_order_id, CallbackOutcome, ItemDetail, PaymentNotification,
    PaymentOrder, Plan,
};
use crate::domain::models::user::Session;
use crate::io::gateway::PaymentGateway;
use crate::storage::Connection;

const UPGRADE_PAYMENT_METHODS: [&str; 3] = ["credit_card", "gopay", "bank_transfer"];
const UPGRADE_EXPIRY_MINUTES: u32 = 60;

/// Prices in rupiah
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub weekly: u64,
    pub monthly: u64,
    pub premium_upgrade: u64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            weekly: 7000,
            monthly: 15000,
            premium_upgrade: 50000,
        }
    }
}

impl Pricing {
    pub fn price_of(&self, plan: Plan) -> u64 {
        match plan {
            Plan::Weekly => self.weekly,
            Plan::Monthly => self.monthly,
        }
    }
}

#[derive(Clone)]
pub struct PaymentService<C: Connection> {
    auth_service: AuthService<C>,
    gateway: Arc<dyn PaymentGateway>,
    pricing: Pricing,
    client_key: String,
}

impl<C: Connection> PaymentService<C> {
    pub fn new(
        auth_service: AuthService<C>,
        gateway: Arc<dyn PaymentGateway>,
        pricing: Pricing,
    ) -> Self {
        Self {
            auth_service,
            gateway,
            pricing,
            client_key: String::new(),
        }
    }

    /// Public key the payment page script needs alongside the redirect URL
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = client_key.into();
        self
    }

    /// Open a payment page for a plan. Does not change the premium flag
    pub async fn checkout(
        &self,
        session: &Session,
        command: CheckoutCommand,
    ) -> FinanceResult<CheckoutResult> {
        let plan = command.plan;
        let amount = self.pricing.price_of(plan);
        let order = PaymentOrder {
            order_id: plan.order_id(Utc::now().timestamp()),
            gross_amount: amount,
            items: vec![ItemDetail {
                id: plan.name().to_string(),
                price: amount,
                quantity: 1,
                name: format!("Premium Plan ({})", plan.name()),
            }],
            customer_name: None,
            enabled_payments: Vec::new(),
            expiry_minutes: None,
        };

        info!("User {} checking out plan {}", session.username, plan.name());
        let redirect_url = self.open_payment_page(&order).await?;
        Ok(CheckoutResult {
            order_id: order.order_id,
            amount,
            redirect_url,
            client_key: self.client_key.clone(),
        })
    }

    /// Server-side upgrade: returns the payment page URL for `premium-<username>`
    pub async fn initiate_upgrade(&self, username: Option<&str>) -> FinanceResult<String> {
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FinanceError::InvalidInput("username is required".to_string()))?;

        if !self.auth_service.user_exists(username).await? {
            warn!("Upgrade requested for unknown user {}", username);
            return Err(FinanceError::UserNotFound);
        }

        let order = PaymentOrder {
            order_id: premium_order_id(username),
            gross_amount: self.pricing.premium_upgrade,
            items: Vec::new(),
            customer_name: Some(username.to_string()),
            enabled_payments: UPGRADE_PAYMENT_METHODS.iter().map(|m| m.to_string()).collect(),
            expiry_minutes: Some(UPGRADE_EXPIRY_MINUTES),
        };
        self.open_payment_page(&order).await
    }

    /// Apply a gateway notification. Only a captured and accepted payment changes state
    pub async fn handle_notification(
        &self,
        notification: &PaymentNotification,
    ) -> FinanceResult<CallbackOutcome> {
        if !notification.is_successful_capture() {
            info!(
                "Ignoring notification for order {:?} (status {:?}, fraud {:?})",
                notification.order_id, notification.transaction_status, notification.fraud_status
            );
            return Ok(CallbackOutcome::Pending);
        }

        let order_id = notification.order_id.as_deref().unwrap_or_default();
        let Some(username) = username_from_order_id(order_id) else {
            warn!("Captured payment with unresolvable order id {:?}", order_id);
            return Ok(CallbackOutcome::UnresolvableOrder);
        };

        if self.auth_service.mark_premium(username).await? {
            info!("User {} upgraded to premium by payment {}", username, order_id);
            Ok(CallbackOutcome::Upgraded {
                username: username.to_string(),
            })
        } else {
            warn!("Captured payment {} for unknown user {}", order_id, username);
            Ok(CallbackOutcome::UnknownUser {
                username: username.to_string(),
            })
        }
    }

    async fn open_payment_page(&self, order: &PaymentOrder) -> FinanceResult<String> {
        self.gateway.create_transaction(order).await.map_err(|e| {
            error!("Payment gateway failed for order {}: {}", order.order_id, e);
            FinanceError::GatewayError(e.to_string())
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::CsvConnection;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records orders and answers with a fixed URL or a fixed error message
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub orders: Mutex<Vec<PaymentOrder>>,
        pub failure: Option<String>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_transaction(&self, order: &PaymentOrder) -> anyhow::Result<String> {
            self.orders.lock().unwrap().push(order.clone());
            match &self.failure {
                Some(message) => Err(anyhow!("{}", message)),
                None => Ok(format!("https://pay.example/{}", order.order_id)),
            }
        }
    }

    async fn setup_test_service(
        gateway: Arc<FakeGateway>,
    ) -> (PaymentService<CsvConnection>, AuthService<CsvConnection>, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let auth = AuthService::new(Arc::new(env.connection.clone()));
        let service = PaymentService::new(auth.clone(), gateway, Pricing::default())
            .with_client_key("Mid-client-test");
        (service, auth, env)
    }

    fn captured(order_id: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: Some(order_id.to_string()),
            transaction_status: Some("capture".to_string()),
            fraud_status: Some("accept".to_string()),
        }
    }

    #[tokio::test]
    async fn test_checkout_uses_plan_price_and_order_id() {
        let gateway = Arc::new(FakeGateway::default());
        let (service, auth, _env) = setup_test_service(gateway.clone()).await;
        auth.register("alice", "pw").await.unwrap();
        let session = auth.login("alice", "pw").await.unwrap();

        let result = service
            .checkout(&session, CheckoutCommand { plan: Plan::Monthly })
            .await
            .unwrap();

        assert_eq!(result.amount, 15000);
        assert!(result.order_id.starts_with("monthly-"));
        assert_eq!(result.redirect_url, format!("https://pay.example/{}", result.order_id));
        assert_eq!(result.client_key, "Mid-client-test");
        assert!(!auth.is_premium(&session.token).await);

        let orders = gateway.orders.lock().unwrap();
        assert_eq!(orders[0].items[0].price, 15000);
        assert_eq!(orders[0].items[0].id, "monthly");
    }

    #[tokio::test]
    async fn test_checkout_surfaces_gateway_message() {
        let gateway = Arc::new(FakeGateway {
            failure: Some("Access denied due to unauthorized transaction".to_string()),
            ..Default::default()
        });
        let (service, auth, _env) = setup_test_service(gateway).await;
        auth.register("alice", "pw").await.unwrap();
        let session = auth.login("alice", "pw").await.unwrap();

        match service.checkout(&session, CheckoutCommand { plan: Plan::Weekly }).await {
            Err(FinanceError::GatewayError(message)) => {
                assert_eq!(message, "Access denied due to unauthorized transaction")
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.order_id)),
        }
    }

    #[tokio::test]
    async fn test_initiate_upgrade() {
        let gateway = Arc::new(FakeGateway::default());
        let (service, auth, _env) = setup_test_service(gateway.clone()).await;
        auth.register("alice", "pw").await.unwrap();

        let url = service.initiate_upgrade(Some("alice")).await.unwrap();
        assert_eq!(url, "https://pay.example/premium-alice");

        let orders = gateway.orders.lock().unwrap();
        assert_eq!(orders[0].gross_amount, 50000);
        assert_eq!(orders[0].customer_name.as_deref(), Some("alice"));
        assert_eq!(orders[0].expiry_minutes, Some(60));
    }

    #[tokio::test]
    async fn test_initiate_upgrade_validation() {
        let (service, _auth, _env) = setup_test_service(Arc::new(FakeGateway::default())).await;
        assert!(matches!(
            service.initiate_upgrade(None).await,
            Err(FinanceError::InvalidInput(_))
        ));
        assert!(matches!(
            service.initiate_upgrade(Some(" ")).await,
            Err(FinanceError::InvalidInput(_))
        ));
        assert!(matches!(
            service.initiate_upgrade(Some("ghost")).await,
            Err(FinanceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_replayed_capture_is_harmless() {
        let (service, auth, env) = setup_test_service(Arc::new(FakeGateway::default())).await;
        auth.register("alice", "pw").await.unwrap();

        let first = service.handle_notification(&captured("premium-alice")).await.unwrap();
        assert_eq!(first, CallbackOutcome::Upgraded { username: "alice".into() });
        let after_first = std::fs::read_to_string(env.connection.users_file_path()).unwrap();

        let second = service.handle_notification(&captured("premium-alice")).await.unwrap();
        assert_eq!(second, CallbackOutcome::Upgraded { username: "alice".into() });
        let after_second = std::fs::read_to_string(env.connection.users_file_path()).unwrap();

        assert_eq!(after_first, after_second);
        assert!(auth.login("alice", "pw").await.unwrap().is_premium);
    }

    #[tokio::test]
    async fn test_non_capture_notifications_are_pending() {
        let (service, auth, _env) = setup_test_service(Arc::new(FakeGateway::default())).await;
        auth.register("alice", "pw").await.unwrap();

        let mut notification = captured("premium-alice");
        notification.transaction_status = Some("pending".into());
        assert_eq!(
            service.handle_notification(&notification).await.unwrap(),
            CallbackOutcome::Pending
        );
        assert_eq!(
            service.handle_notification(&PaymentNotification::default()).await.unwrap(),
            CallbackOutcome::Pending
        );
        assert!(!auth.login("alice", "pw").await.unwrap().is_premium);
    }

    #[tokio::test]
    async fn test_capture_for_unknown_or_unresolvable_order() {
        let (service, _auth, _env) = setup_test_service(Arc::new(FakeGateway::default())).await;
        assert_eq!(
            service.handle_notification(&captured("premium-ghost")).await.unwrap(),
            CallbackOutcome::UnknownUser { username: "ghost".into() }
        );
        assert_eq!(
            service.handle_notification(&captured("weekly-1700000000")).await.unwrap(),
            CallbackOutcome::UnresolvableOrder
        );
    }
}
