use crate::domain::balance_service::BalanceService;
use crate::domain::models::report::{LedgerSummary, MonthlyReport};
use shared::{
    CategoryBreakdown, CategoryTotal, DailyTotal, LedgerSummaryResponse, MonthlyReportResponse,
};

pub struct ReportMapper;

impl ReportMapper {
    pub fn to_monthly_report_response(report: MonthlyReport) -> MonthlyReportResponse {
        let period = report.period_label();
        MonthlyReportResponse {
            username: report.username,
            period,
            monthly_total: report.monthly_total,
            weekly_total: report.weekly_total,
            categories: report
                .categories
                .into_iter()
                .map(|c| CategoryTotal {
                    category: c.category,
                    amount: c.amount,
                })
                .collect(),
            daily: report
                .daily
                .into_iter()
                .map(|d| DailyTotal {
                    date: d.date,
                    amount: d.amount,
                })
                .collect(),
        }
    }

    pub fn to_summary_response(summary: LedgerSummary, currency: &str) -> LedgerSummaryResponse {
        LedgerSummaryResponse {
            total_income: summary.total_income,
            total_expense: summary.total_expense,
            balance: summary.balance,
            formatted_expense: BalanceService::format_money_in(summary.total_expense, currency),
            formatted_balance: BalanceService::format_money_in(summary.balance, currency),
            categories: summary
                .categories
                .into_iter()
                .map(|c| CategoryBreakdown {
                    category: c.category,
                    income: c.income,
                    expense: c.expense,
                })
                .collect(),
        }
    }
}
