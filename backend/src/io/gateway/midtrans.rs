use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use super::PaymentGateway;
use crate::domain::models::payment::{ItemDetail, PaymentOrder};

pub const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
pub const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";

const UA: &str = concat!("finance-tracker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct SnapRequest<'a> {
    transaction_details: TransactionDetails<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    item_details: &'a [ItemDetail],
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_details: Option<CustomerDetails<'a>>,
    #[serde(skip_serializing_if = "is_empty")]
    enabled_payments: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry: Option<Expiry>,
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: u64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
}

#[derive(Debug, Serialize)]
struct Expiry {
    start_time: String,
    unit: &'static str,
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    redirect_url: Option<String>,
    #[serde(default)]
    error_messages: Vec<String>,
}

/// Midtrans Snap API client (`POST /snap/v1/transactions`, basic auth with the server key)
#[derive(Clone)]
pub struct MidtransSnapClient {
    client: Client,
    base_url: String,
    server_key: String,
}

impl MidtransSnapClient {
    pub fn new(
        server_key: impl Into<String>,
        is_production: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = if is_production {
            PRODUCTION_BASE_URL
        } else {
            SANDBOX_BASE_URL
        };
        Self::with_base_url(server_key, base_url, timeout)
    }

    pub fn with_base_url(
        server_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            server_key: server_key.into(),
        })
    }

    fn build_request<'a>(order: &'a PaymentOrder) -> SnapRequest<'a> {
        SnapRequest {
            transaction_details: TransactionDetails {
                order_id: &order.order_id,
                gross_amount: order.gross_amount,
            },
            item_details: &order.items,
            customer_details: order
                .customer_name
                .as_deref()
                .map(|first_name| CustomerDetails { first_name }),
            enabled_payments: &order.enabled_payments,
            expiry: order.expiry_minutes.map(|duration| Expiry {
                start_time: Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string(),
                unit: "minute",
                duration,
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for MidtransSnapClient {
    async fn create_transaction(&self, order: &PaymentOrder) -> Result<String> {
        let url = format!("{}/snap/v1/transactions", self.base_url);
        info!("Creating Snap transaction for order {}", order.order_id);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .json(&Self::build_request(order))
            .send()
            .await
            .map_err(|e| {
                error!("Snap request for order {} failed: {}", order.order_id, e);
                anyhow!("{}", e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(
                "Unable to read Snap response for order {} ({}): {}",
                order.order_id, status, e
            );
            anyhow!("payment gateway returned {} with an unreadable body: {}", status, e)
        })?;
        let parsed: Option<SnapResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(SnapResponse {
                redirect_url: Some(redirect_url),
                ..
            }) if status.is_success() => {
                info!("Snap transaction created for order {}", order.order_id);
                Ok(redirect_url)
            }
            Some(snap) if !snap.error_messages.is_empty() => {
                let message = snap.error_messages.join(", ");
                error!("Snap rejected order {} ({}): {}", order.order_id, status, message);
                Err(anyhow!("{}", message))
            }
            _ => {
                error!(
                    "Unexpected Snap response for order {} ({}): {}",
                    order.order_id, status, body
                );
                Err(anyhow!("{}", unexpected_response_message(status, &body)))
            }
        }
    }
}

fn unexpected_response_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        format!("payment gateway returned {}", status)
    } else {
        body.trim().to_string()
    }
}
