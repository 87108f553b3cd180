//! Monthly report aggregation, chart images and PDF export.
//!
//! Aggregation is relative to a caller-supplied `now`. Entries without a date
//! count as dated `now`. The monthly view keeps entries from the same calendar
//! year and month as `now`; the weekly total covers entries dated on or after
//! `now - 7 days`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{error, info};

use crate::domain::balance_service::BalanceService;
use crate::domain::chart_service::ChartService;
use crate::domain::commands::reports::ExportReportCommand;
use crate::domain::errors::{FinanceError, FinanceResult};
use crate::domain::localization::Localizer;
use crate::domain::models::report::{CategoryTotal, DailyTotal, MonthlyReport};
use crate::domain::models::transaction::Transaction;
use crate::domain::models::user::Session;
use crate::domain::pdf_service::{PdfService, ReportCharts, ReportLabels};
use crate::storage::{Connection, CsvConnection, LedgerStorage};

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    reports_directory: PathBuf,
    chart_service: ChartService,
    pdf_service: PdfService,
    localizer: Localizer,
}

impl<C: Connection> ReportService<C> {
    pub fn new(
        connection: Arc<C>,
        reports_directory: PathBuf,
        chart_service: ChartService,
        pdf_service: PdfService,
        localizer: Localizer,
    ) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        Self {
            ledger_repository,
            reports_directory,
            chart_service,
            pdf_service,
            localizer,
        }
    }

    /// Aggregate the session user's ledger for the month containing `now`
    pub async fn monthly_report(
        &self,
        session: &Session,
        now: NaiveDateTime,
    ) -> FinanceResult<MonthlyReport> {
        let transactions = self
            .ledger_repository
            .read_transactions(&session.username)
            .await?;
        build_monthly_report(&session.username, &transactions, now)
    }

    /// PNG pie chart of this month's category sums
    pub async fn monthly_category_chart(
        &self,
        session: &Session,
        now: NaiveDateTime,
    ) -> FinanceResult<Vec<u8>> {
        let report = self.monthly_report(session, now).await?;
        let chart_service = self.chart_service.clone();
        run_blocking(move || {
            ChartService::encode_png(chart_service.category_chart(&report.categories)?)
        })
        .await
    }

    /// PNG bar chart of this month's daily sums
    pub async fn monthly_daily_chart(
        &self,
        session: &Session,
        now: NaiveDateTime,
    ) -> FinanceResult<Vec<u8>> {
        let report = self.monthly_report(session, now).await?;
        let chart_service = self.chart_service.clone();
        run_blocking(move || ChartService::encode_png(chart_service.daily_chart(&report.daily)?))
            .await
    }

    /// PNG grouped bars of income and expense per category over the whole ledger
    pub async fn ledger_chart(&self, session: &Session) -> FinanceResult<Vec<u8>> {
        let transactions = self
            .ledger_repository
            .read_transactions(&session.username)
            .await?;
        if transactions.is_empty() {
            return Err(FinanceError::NoData);
        }

        let summary = BalanceService::new().summarize(&transactions);
        let chart_service = self.chart_service.clone();
        run_blocking(move || {
            ChartService::encode_png(chart_service.ledger_chart(&summary.categories)?)
        })
        .await
    }

    /// Write the monthly PDF report. Premium sessions only
    pub async fn export_pdf(
        &self,
        session: &Session,
        command: ExportReportCommand,
        now: NaiveDateTime,
    ) -> FinanceResult<PathBuf> {
        if !session.is_premium {
            info!("PDF export refused for non-premium user {}", session.username);
            return Err(FinanceError::PremiumRequired);
        }

        let currency = BalanceService::resolve_currency(command.currency.as_deref())?;
        let path = match command.file_name.as_deref() {
            Some(file_name) => self.custom_report_path(&session.username, file_name)?,
            None => self.default_report_path(&session.username, now),
        };
        let report = self.monthly_report(session, now).await?;
        let labels = self.labels(&command.language, currency);
        let chart_service = self.chart_service.clone();
        let pdf_service = self.pdf_service.clone();

        let written = path.clone();
        run_blocking(move || {
            let charts = ReportCharts {
                categories: chart_service.category_chart(&report.categories)?,
                daily: chart_service.daily_chart(&report.daily)?,
            };
            let bytes = pdf_service.render(&report, &labels, charts)?;
            write_report(&written, &bytes)
        })
        .await?;

        info!("Wrote monthly report for {} to {}", session.username, path.display());
        Ok(path)
    }

    /// `<reports>/monthly_report_<user>_<YYYY-MM>.pdf`
    pub fn default_report_path(&self, username: &str, now: NaiveDateTime) -> PathBuf {
        self.reports_directory.join(format!(
            "monthly_report_{}_{}.pdf",
            CsvConnection::encode_file_stem(username),
            now.format("%Y-%m")
        ))
    }

    /// `<reports>/<user>/<file_name>`. Only a bare file name is accepted
    pub fn custom_report_path(&self, username: &str, file_name: &str) -> FinanceResult<PathBuf> {
        let file_name = sanitize_file_name(file_name)?;
        Ok(self
            .reports_directory
            .join(CsvConnection::encode_file_stem(username))
            .join(file_name))
    }

    fn labels(&self, language: &str, currency: &str) -> ReportLabels {
        let t = |key: &str| self.localizer.translate(language, key);
        ReportLabels {
            title: t("report_title"),
            user: t("report_user"),
            period: t("report_period"),
            monthly_total: t("report_monthly_total"),
            weekly_total: t("report_weekly_total"),
            categories_chart: t("chart_categories"),
            daily_chart: t("chart_daily"),
            breakdown: t("report_breakdown"),
            signature: t("report_signature"),
            generated: t("report_generated"),
            income: t("pemasukan"),
            expense: t("pengeluaran"),
            currency: currency.to_string(),
        }
    }
}

/// Pure aggregation behind `monthly_report`
pub fn build_monthly_report(
    username: &str,
    transactions: &[Transaction],
    now: NaiveDateTime,
) -> FinanceResult<MonthlyReport> {
    if transactions.is_empty() {
        return Err(FinanceError::NoData);
    }

    let today = now.date();
    let week_start = now - Duration::days(7);
    let dated = || transactions.iter().map(move |t| (t.date.unwrap_or(today), t));

    let monthly: Vec<(NaiveDate, &Transaction)> = dated()
        .filter(|(date, _)| date.year() == today.year() && date.month() == today.month())
        .collect();
    if monthly.is_empty() {
        return Err(FinanceError::NoDataThisMonth);
    }

    let weekly_total: f64 = dated()
        .filter(|(date, _)| {
            date.and_hms_opt(0, 0, 0)
                .map_or(false, |start| start >= week_start)
        })
        .map(|(_, t)| t.amount)
        .sum();

    let mut categories: BTreeMap<String, f64> = BTreeMap::new();
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, transaction) in &monthly {
        *categories
            .entry(BalanceService::category_of(transaction).to_string())
            .or_insert(0.0) += transaction.amount;
        *daily.entry(*date).or_insert(0.0) += transaction.amount;
    }

    Ok(MonthlyReport {
        username: username.to_string(),
        generated_at: now,
        monthly_total: monthly.iter().map(|(_, t)| t.amount).sum(),
        weekly_total,
        categories: categories
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect(),
        daily: daily
            .into_iter()
            .map(|(date, amount)| DailyTotal { date, amount })
            .collect(),
    })
}

fn write_report(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create report directory {}", parent.display()))?;
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("Unable to write report {}", path.display()))
}

/// Trim quotes and whitespace, reject anything that is not a plain file name,
/// and make sure the name ends in `.pdf`
fn sanitize_file_name(raw: &str) -> FinanceResult<String> {
    let mut cleaned = raw.trim();
    if cleaned.len() >= 2
        && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
    {
        cleaned = cleaned[1..cleaned.len() - 1].trim();
    }

    if cleaned.is_empty()
        || cleaned.starts_with('.')
        || cleaned.contains(['/', '\\', ':', '\0'])
    {
        return Err(FinanceError::InvalidInput(format!(
            "report file name {:?} must be a plain file name",
            raw
        )));
    }

    if cleaned.to_ascii_lowercase().ends_with(".pdf") {
        Ok(cleaned.to_string())
    } else {
        Ok(format!("{}.pdf", cleaned))
    }
}

/// Run CPU-bound rendering off the async worker threads
async fn run_blocking<T, F>(work: F) -> FinanceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => Ok(result?),
        Err(e) => {
            error!("Rendering task failed: {}", e);
            Err(FinanceError::Storage(anyhow::anyhow!("rendering task failed: {}", e)))
        }
    }
}
