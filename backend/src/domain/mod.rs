//! # Domain Layer
//!
//! Business rules of the finance tracker: authentication and sessions, the
//! per-user transaction ledger, monthly reports and premium payments.
//! Services are generic over the storage `Connection` and never touch files
//! directly.

pub mod auth_service;
pub mod balance_service;
pub mod chart_service;
pub mod commands;
pub mod errors;
pub mod ledger_service;
pub mod localization;
pub mod models;
pub mod payment_service;
pub mod pdf_service;
pub mod report_service;

pub use auth_service::AuthService;
pub use balance_service::BalanceService;
pub use chart_service::ChartService;
pub use errors::{FinanceError, FinanceResult};
pub use ledger_service::LedgerService;
pub use localization::Localizer;
pub use payment_service::{PaymentService, Pricing};
pub use pdf_service::PdfService;
pub use report_service::ReportService;
