//! # Finance Tracker Backend
//!
//! All non-UI logic of the personal finance tracker.
//!
//! ## Architecture
//!
//! ```text
//! Presentation layer (any HTTP client)
//!     ↓
//! IO Layer (REST API, payment gateway client)
//!     ↓
//! Domain Layer (auth, ledger, reports, payments, localization)
//!     ↓
//! Storage Layer (JSON credentials, per-user CSV ledgers)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::{AppConfig, PaymentConfig};
use crate::domain::{
    AuthService, BalanceService, ChartService, LedgerService, Localizer, PaymentService, PdfService,
    ReportService,
};
use crate::io::gateway::{MidtransSnapClient, PaymentGateway};
use crate::io::rest::{auth_apis, i18n_apis, payment_apis, report_apis, transaction_apis};
use crate::storage::CsvConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService<CsvConnection>,
    pub ledger_service: LedgerService<CsvConnection>,
    pub report_service: ReportService<CsvConnection>,
    pub payment_service: PaymentService<CsvConnection>,
    pub localizer: Localizer,
    pub cors_origin: String,
}

impl AppState {
    /// Wire every service onto one storage connection
    pub fn new(
        connection: CsvConnection,
        gateway: Arc<dyn PaymentGateway>,
        localizer: Localizer,
        payment: &PaymentConfig,
        cors_origin: impl Into<String>,
    ) -> Self {
        let reports_directory = connection.reports_directory();
        let connection = Arc::new(connection);

        let auth_service = AuthService::new(connection.clone());
        let ledger_service = LedgerService::new(connection.clone(), BalanceService::new());
        let report_service = ReportService::new(
            connection.clone(),
            reports_directory,
            ChartService::new(),
            PdfService::new(),
            localizer.clone(),
        );
        let payment_service =
            PaymentService::new(auth_service.clone(), gateway, payment.pricing.clone())
                .with_client_key(payment.client_key.clone());

        Self {
            auth_service,
            ledger_service,
            report_service,
            payment_service,
            localizer,
            cors_origin: cors_origin.into(),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let data_directory = config.resolved_data_directory()?;
    info!("Setting up data directory {}", data_directory.display());
    let connection = CsvConnection::new(&data_directory)?;

    info!("Setting up payment gateway");
    let payment = &config.payment;
    if payment.server_key.is_empty() {
        warn!("No payment server key configured; the gateway will reject checkout requests");
    }
    let timeout = Duration::from_secs(payment.timeout_seconds);
    let gateway = match &payment.base_url {
        Some(base_url) => {
            MidtransSnapClient::with_base_url(&payment.server_key, base_url, timeout)?
        }
        None => MidtransSnapClient::new(&payment.server_key, payment.is_production, timeout)?,
    };

    info!("Setting up application state");
    Ok(AppState::new(
        connection,
        Arc::new(gateway),
        Localizer::new(&config.default_language),
        payment,
        config.cors_origin.clone(),
    ))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match app_state.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any origin", app_state.cors_origin);
            cors.allow_origin(Any)
        }
    };

    let api_routes = Router::new()
        .nest("/auth", auth_apis::router())
        .merge(transaction_apis::router())
        .merge(report_apis::router())
        .merge(payment_apis::router())
        .merge(i18n_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
