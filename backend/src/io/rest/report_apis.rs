//! # REST API for Reports and Charts
//!
//! Monthly aggregates, PNG charts and the premium-only PDF export. All
//! aggregation is relative to the server's local time.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use tracing::info;

use crate::domain::commands::reports::ExportReportCommand;
use crate::domain::errors::FinanceResult;
use crate::io::rest::mappers::report_mapper::ReportMapper;
use crate::io::rest::{ApiError, AuthSession};
use crate::AppState;
use shared::{ExportReportRequest, ExportReportResponse};

/// Create a router for report and chart APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/monthly", get(get_monthly_report))
        .route("/reports/monthly/pdf", post(export_monthly_pdf))
        .route("/charts/categories.png", get(get_ledger_chart))
        .route("/charts/monthly/categories.png", get(get_monthly_category_chart))
        .route("/charts/monthly/daily.png", get(get_monthly_daily_chart))
}

/// This month's totals, category sums and daily sums
pub async fn get_monthly_report(
    State(state): State<AppState>,
    auth: AuthSession,
) -> impl IntoResponse {
    info!("GET /api/reports/monthly - user: {}", auth.session.username);

    match state
        .report_service
        .monthly_report(&auth.session, Local::now().naive_local())
        .await
    {
        Ok(report) => {
            (StatusCode::OK, Json(ReportMapper::to_monthly_report_response(report))).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Write this month's PDF report (premium only)
pub async fn export_monthly_pdf(
    State(state): State<AppState>,
    auth: AuthSession,
    request: Option<Json<ExportReportRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    info!(
        "POST /api/reports/monthly/pdf - user: {}, file: {:?}",
        auth.session.username, request.file_name
    );

    let command = ExportReportCommand {
        file_name: request.file_name,
        language: auth.language.to_string(),
        currency: request.currency,
    };

    match state
        .report_service
        .export_pdf(&auth.session, command, Local::now().naive_local())
        .await
    {
        Ok(path) => {
            let response = ExportReportResponse {
                path: path.display().to_string(),
                success_message: state.localizer.translate(auth.language, "pdf_generated"),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Income/expense bars per category over the whole ledger
pub async fn get_ledger_chart(State(state): State<AppState>, auth: AuthSession) -> Response {
    info!("GET /api/charts/categories.png - user: {}", auth.session.username);
    png_response(&state, &auth, state.report_service.ledger_chart(&auth.session).await)
}

/// This month's spending per category
pub async fn get_monthly_category_chart(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Response {
    info!("GET /api/charts/monthly/categories.png - user: {}", auth.session.username);
    let result = state
        .report_service
        .monthly_category_chart(&auth.session, Local::now().naive_local())
        .await;
    png_response(&state, &auth, result)
}

/// This month's spending per day
pub async fn get_monthly_daily_chart(State(state): State<AppState>, auth: AuthSession) -> Response {
    info!("GET /api/charts/monthly/daily.png - user: {}", auth.session.username);
    let result = state
        .report_service
        .monthly_daily_chart(&auth.session, Local::now().naive_local())
        .await;
    png_response(&state, &auth, result)
}

fn png_response(state: &AppState, auth: &AuthSession, result: FinanceResult<Vec<u8>>) -> Response {
    match result {
        Ok(png) => (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::transactions::NewTransactionCommand;
    use crate::test_support::{login_as, setup_test_state};

    fn food(amount: f64) -> NewTransactionCommand {
        NewTransactionCommand {
            date: None,
            category: "Food".into(),
            note: String::new(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_monthly_report_without_data_is_not_found() {
        let (state, _env) = setup_test_state().await;
        let auth = login_as(&state, "alice", false).await;

        let response = get_monthly_report(State(state), auth).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pdf_export_rejects_file_outside_report_directory() {
        let (state, env) = setup_test_state().await;
        state.auth_service.register("victim", "pw").await.unwrap();
        let auth = login_as(&state, "mallory", true).await;
        state
            .ledger_service
            .append(&auth.session, vec![food(-5.0)])
            .await
            .unwrap();

        let request = ExportReportRequest {
            file_name: Some(env.connection.users_file_path().display().to_string()),
            currency: None,
        };
        let response = export_monthly_pdf(State(state.clone()), auth, Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.auth_service.login("victim", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_pdf_export_with_file_name() {
        let (state, env) = setup_test_state().await;
        let auth = login_as(&state, "alice", true).await;
        state
            .ledger_service
            .append(&auth.session, vec![food(-5.0)])
            .await
            .unwrap();

        let request = ExportReportRequest {
            file_name: Some("mine".into()),
            currency: Some("USD".into()),
        };
        let response = export_monthly_pdf(State(state), auth, Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(env
            .connection
            .reports_directory()
            .join("alice")
            .join("mine.pdf")
            .exists());
    }

    #[tokio::test]
    async fn test_pdf_export_requires_premium() {
        let (state, _env) = setup_test_state().await;
        let auth = login_as(&state, "alice", false).await;

        let response = export_monthly_pdf(State(state), auth, None).await.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
