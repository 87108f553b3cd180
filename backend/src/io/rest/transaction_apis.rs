//! # REST API for Transactions
//!
//! Endpoints for reading, appending and deleting ledger entries of the
//! logged-in user, plus the income/expense summary.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::domain::balance_service::BalanceService;
use crate::domain::commands::transactions::DeleteTransactionCommand;
use crate::domain::errors::FinanceError;
use crate::io::rest::mappers::report_mapper::ReportMapper;
use crate::io::rest::mappers::transaction_mapper::TransactionMapper;
use crate::io::rest::{ApiError, AuthSession};
use crate::AppState;
use shared::{
    AppendTransactionsRequest, AppendTransactionsResponse, DeleteTransactionResponse,
    TransactionListResponse,
};

/// Create a router for transaction related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(append_transactions))
        .route("/transactions/summary", get(get_summary))
        .route("/transactions/:id", delete(delete_transaction))
        .route("/transactions/position/:index", delete(delete_transaction_at))
}

/// List the whole ledger in insertion order
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthSession,
) -> impl IntoResponse {
    info!("GET /api/transactions - user: {}", auth.session.username);

    match state.ledger_service.read_all(&auth.session).await {
        Ok(transactions) => {
            let response = TransactionListResponse {
                transactions: transactions.into_iter().map(TransactionMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Append one or more transactions
pub async fn append_transactions(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(request): Json<AppendTransactionsRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/transactions - user: {}, count: {}",
        auth.session.username,
        request.transactions.len()
    );

    let commands = request
        .transactions
        .into_iter()
        .map(TransactionMapper::to_command)
        .collect();

    match state.ledger_service.append(&auth.session, commands).await {
        Ok(result) => {
            let response = AppendTransactionsResponse {
                transactions: result
                    .transactions
                    .into_iter()
                    .map(TransactionMapper::to_dto)
                    .collect(),
                success_message: state.localizer.translate(auth.language, "transaction_saved"),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Delete a transaction by id
pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{} - user: {}", id, auth.session.username);
    delete_with(&state, &auth, DeleteTransactionCommand::ById(id)).await
}

/// Delete a transaction by its position in the ledger
pub async fn delete_transaction_at(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    info!(
        "DELETE /api/transactions/position/{} - user: {}",
        index, auth.session.username
    );
    delete_with(&state, &auth, DeleteTransactionCommand::ByPosition(index)).await
}

async fn delete_with(
    state: &AppState,
    auth: &AuthSession,
    command: DeleteTransactionCommand,
) -> axum::response::Response {
    let result = match state.ledger_service.delete(&auth.session, command).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(FinanceError::CannotDelete),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            let response = DeleteTransactionResponse {
                deleted: true,
                success_message: state.localizer.translate(auth.language, "transaction_deleted"),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Display currency for the summary; `Rp` when omitted
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub currency: Option<String>,
}

/// Totals and per-category breakdown for the home screen
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    info!(
        "GET /api/transactions/summary - user: {}, currency: {:?}",
        auth.session.username, query.currency
    );

    let result = match BalanceService::resolve_currency(query.currency.as_deref()) {
        Ok(currency) => state
            .ledger_service
            .summary(&auth.session)
            .await
            .map(|summary| ReportMapper::to_summary_response(summary, currency)),
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}
