//! # REST API for Payments
//!
//! Premium checkout, the server-side upgrade flow and the payment gateway's
//! notification webhook. The webhook is unauthenticated and its status
//! fields are taken at face value.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::{info, warn};

use crate::domain::errors::FinanceError;
use crate::domain::models::payment::CallbackOutcome;
use crate::io::rest::mappers::payment_mapper::PaymentMapper;
use crate::io::rest::{ApiError, AuthSession, RequestLanguage};
use crate::AppState;
use shared::{
    CheckoutRequest, ErrorResponse, MessageResponse, PaymentNotification, UpgradeRequest,
    UpgradeResponse,
};

/// Create a router for payment APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/checkout", post(checkout))
        .route("/upgrade", post(initiate_upgrade))
        .route("/midtrans/callback", post(payment_callback))
}

/// Open a payment page for a subscription plan
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(request): Json<CheckoutRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/payments/checkout - user: {}, plan: {:?}",
        auth.session.username, request.plan
    );

    let command = PaymentMapper::to_checkout_command(request);
    match state.payment_service.checkout(&auth.session, command).await {
        Ok(result) => {
            (StatusCode::OK, Json(PaymentMapper::to_checkout_response(result))).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Start the premium upgrade for a username and return the payment page URL
pub async fn initiate_upgrade(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    request: Option<Json<UpgradeRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    info!("POST /api/upgrade - username: {:?}", request.username);

    match state
        .payment_service
        .initiate_upgrade(request.username.as_deref())
        .await
    {
        Ok(snap_url) => (StatusCode::OK, Json(UpgradeResponse { snap_url })).into_response(),
        Err(FinanceError::InvalidInput(_)) => ApiError {
            status: StatusCode::BAD_REQUEST,
            reason: "username_required".to_string(),
            message: state.localizer.translate(language, "username_required"),
        }
        .into_response(),
        Err(e @ FinanceError::GatewayError(_)) => {
            ApiError::from_domain(e, &state.localizer, language)
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, language).into_response(),
    }
}

/// Payment gateway notification webhook
pub async fn payment_callback(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    Json(notification): Json<PaymentNotification>,
) -> impl IntoResponse {
    info!(
        "POST /api/midtrans/callback - order: {:?}, status: {:?}, fraud: {:?}",
        notification.order_id, notification.transaction_status, notification.fraud_status
    );

    let notification = PaymentMapper::to_domain_notification(notification);
    let message = |key: &str| MessageResponse {
        message: state.localizer.translate(language, key),
    };

    match state.payment_service.handle_notification(&notification).await {
        Ok(CallbackOutcome::Upgraded { .. }) => {
            (StatusCode::OK, Json(message("user_upgraded"))).into_response()
        }
        Ok(CallbackOutcome::Pending) => {
            (StatusCode::OK, Json(message("payment_pending"))).into_response()
        }
        Ok(CallbackOutcome::UnresolvableOrder) => {
            warn!("Callback order id {:?} does not name a user", notification.order_id);
            let body = ErrorResponse {
                reason: "invalid_order_id".to_string(),
                message: state.localizer.translate(language, "invalid_input"),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Ok(CallbackOutcome::UnknownUser { username }) => {
            warn!("Callback for unknown user {}", username);
            ApiError::from_domain(FinanceError::UserNotFound, &state.localizer, language)
                .into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, language).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_state;

    fn captured(order_id: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: Some(order_id.to_string()),
            transaction_status: Some("capture".to_string()),
            fraud_status: Some("accept".to_string()),
        }
    }

    #[tokio::test]
    async fn test_callback_outcomes() {
        let (state, _env) = setup_test_state().await;
        state.auth_service.register("alice", "pw").await.unwrap();

        let status = |response: axum::response::Response| response.status();

        let response = payment_callback(
            State(state.clone()),
            RequestLanguage("en"),
            Json(captured("premium-alice")),
        )
        .await
        .into_response();
        assert_eq!(status(response), StatusCode::OK);

        let response = payment_callback(
            State(state.clone()),
            RequestLanguage("en"),
            Json(captured("premium-bob")),
        )
        .await
        .into_response();
        assert_eq!(status(response), StatusCode::NOT_FOUND);

        let response = payment_callback(
            State(state.clone()),
            RequestLanguage("en"),
            Json(captured("weekly-1")),
        )
        .await
        .into_response();
        assert_eq!(status(response), StatusCode::BAD_REQUEST);

        let response = payment_callback(
            State(state),
            RequestLanguage("en"),
            Json(PaymentNotification::default()),
        )
        .await
        .into_response();
        assert_eq!(status(response), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upgrade_requires_username() {
        let (state, _env) = setup_test_state().await;
        let response = initiate_upgrade(State(state), RequestLanguage("id"), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
