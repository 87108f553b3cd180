//! # REST API for Translations
//!
//! Lets the presentation layer look up UI strings with the same fallback
//! chain the server uses for its own messages.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::domain::localization::Localizer;
use crate::AppState;
use shared::TranslationResponse;

/// Create a router for translation APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/i18n/:lang/:key", get(translate))
}

/// Translate one key; unsupported languages fall back to the default
pub async fn translate(
    State(state): State<AppState>,
    Path((lang, key)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/i18n/{}/{}", lang, key);

    let language = Localizer::supported(&lang).unwrap_or(state.localizer.default_language());
    let response = TranslationResponse {
        lang: language.to_string(),
        text: state.localizer.translate(language, &key),
        key,
    };
    (StatusCode::OK, Json(response))
}
