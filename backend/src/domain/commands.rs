//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod transactions {
    use chrono::NaiveDate;

    use super::super::models::transaction::Transaction as DomainTransaction;

    /// Input for one transaction to append.
    #[derive(Debug, Clone)]
    pub struct NewTransactionCommand {
        /// Defaults to today when absent
        pub date: Option<NaiveDate>,
        /// Defaults to `Others` when blank
        pub category: String,
        pub note: String,
        pub amount: f64,
    }

    /// Result of appending transactions.
    #[derive(Debug, Clone)]
    pub struct AppendTransactionsResult {
        pub transactions: Vec<DomainTransaction>,
    }

    /// Which entry to delete.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DeleteTransactionCommand {
        ById(String),
        ByPosition(usize),
    }
}

pub mod reports {
    /// Input for exporting the monthly PDF report.
    #[derive(Debug, Clone, Default)]
    pub struct ExportReportCommand {
        /// Bare file name placed in the user's report directory. Defaults to
        /// `<data_dir>/reports/monthly_report_<user>_<YYYY-MM>.pdf`
        pub file_name: Option<String>,
        /// Language of the report's labels
        pub language: String,
        /// Display currency; `Rp` when absent
        pub currency: Option<String>,
    }
}

pub mod payments {
    use super::super::models::payment::Plan;

    /// Input for a client-side premium checkout.
    #[derive(Debug, Clone)]
    pub struct CheckoutCommand {
        pub plan: Plan,
    }

    /// Result of a checkout: where to send the payer.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CheckoutResult {
        pub order_id: String,
        pub amount: u64,
        pub redirect_url: String,
        pub client_key: String,
    }
}
