//! # REST API Interface Layer
//!
//! HTTP endpoints for the finance tracker. This layer handles:
//! - JSON request/response serialization
//! - Bearer-token session lookup and per-request language selection
//! - Translating domain errors to status codes with a localized message
//!
//! Handlers are a pure translation layer; business rules live in the domain.

pub mod auth_apis;
pub mod i18n_apis;
pub mod mappers;
pub mod payment_apis;
pub mod report_apis;
pub mod transaction_apis;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use crate::domain::errors::FinanceError;
use crate::domain::localization::Localizer;
use crate::domain::models::user::Session;
use crate::AppState;
use shared::ErrorResponse;

/// Error response: a status code plus `{reason, message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub reason: String,
    pub message: String,
}

impl ApiError {
    /// Translate a domain error into the caller's language
    pub fn from_domain(error: FinanceError, localizer: &Localizer, language: &str) -> Self {
        let status = Self::status_for(&error);
        if status.is_server_error() {
            error!("Request failed: {}", error_chain(&error));
        }

        let localized = localizer.translate(language, error.message_key());
        let message = match &error {
            FinanceError::GatewayError(provider_message) => provider_message.clone(),
            FinanceError::InvalidInput(detail) => format!("{}: {}", localized, detail),
            _ => localized,
        };

        Self {
            status,
            reason: error.reason_code().to_string(),
            message,
        }
    }

    pub fn status_for(error: &FinanceError) -> StatusCode {
        match error {
            FinanceError::UserExists => StatusCode::CONFLICT,
            FinanceError::LoginFailed | FinanceError::NoSession => StatusCode::UNAUTHORIZED,
            FinanceError::PremiumRequired => StatusCode::FORBIDDEN,
            FinanceError::NoData
            | FinanceError::NoDataThisMonth
            | FinanceError::CannotDelete
            | FinanceError::UserNotFound => StatusCode::NOT_FOUND,
            FinanceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FinanceError::GatewayError(_) => StatusCode::BAD_GATEWAY,
            FinanceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

fn error_chain(error: &FinanceError) -> String {
    match error {
        FinanceError::Storage(inner) => format!("{:#}", inner),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            reason: self.reason,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    lang: Option<String>,
}

/// Response language: `?lang=`, then `Accept-Language`, then the configured default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLanguage(pub &'static str);

impl RequestLanguage {
    fn from_parts(parts: &Parts, localizer: &Localizer) -> Self {
        let query_language = Query::<LanguageQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.lang)
            .and_then(|lang| Localizer::supported(&lang));
        if let Some(language) = query_language {
            return Self(language);
        }

        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        Self(localizer.resolve(header_value))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestLanguage {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, &state.localizer))
    }
}

/// The caller's session, looked up from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session: Session,
    pub language: &'static str,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequestLanguage(language) = RequestLanguage::from_parts(parts, &state.localizer);

        let session = match bearer_token(&parts.headers) {
            Some(token) => state.auth_service.session(&token).await,
            None => Err(FinanceError::NoSession),
        }
        .map_err(|e| ApiError::from_domain(e, &state.localizer, language))?;

        Ok(Self { session, language })
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
