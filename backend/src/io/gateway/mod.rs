//! # Payment Gateway Interface
//!
//! Outbound calls to the payment provider. The domain layer only sees the
//! `PaymentGateway` trait; `MidtransSnapClient` is the production implementation.

pub mod midtrans;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::payment::PaymentOrder;

pub use midtrans::MidtransSnapClient;

/// Opens a hosted payment page for an order
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create the provider-side transaction and return the URL to send the payer to.
    /// On failure the error's message is the provider's own, unmodified
    async fn create_transaction(&self, order: &PaymentOrder) -> Result<String>;
}
