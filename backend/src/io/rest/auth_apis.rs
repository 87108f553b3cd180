//! # REST API for Authentication
//!
//! Register, login/logout and session refresh. Login returns the bearer token
//! used by every other authenticated endpoint.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::models::user::Session;
use crate::io::rest::{bearer_token, ApiError, AuthSession, RequestLanguage};
use crate::AppState;
use shared::{LoginRequest, MessageResponse, RegisterRequest, RegisterResponse, SessionResponse};

/// Create a router for authentication APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(refresh_session))
        .route("/upgrade", post(upgrade))
}

fn session_response(state: &AppState, session: Session, language: &str) -> SessionResponse {
    let status_key = if session.is_premium {
        "status_premium"
    } else {
        "status_free"
    };
    SessionResponse {
        status_label: state.localizer.translate(language, status_key),
        token: session.token,
        username: session.username,
        is_premium: session.is_premium,
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/register - username: {}", request.username);

    match state
        .auth_service
        .register(&request.username, &request.password)
        .await
    {
        Ok(()) => {
            let response = RegisterResponse {
                username: request.username,
                success_message: state.localizer.translate(language, "register_success"),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, language).into_response(),
    }
}

/// Log in and receive a session token
pub async fn login(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login - username: {}", request.username);

    match state
        .auth_service
        .login(&request.username, &request.password)
        .await
    {
        Ok(session) => {
            (StatusCode::OK, Json(session_response(&state, session, language))).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, language).into_response(),
    }
}

/// Log out. Unknown or missing tokens are accepted
pub async fn logout(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!("POST /api/auth/logout");

    if let Some(token) = bearer_token(&headers) {
        state.auth_service.logout(&token).await;
    }
    let response = MessageResponse {
        message: state.localizer.translate(language, "logout_success"),
    };
    (StatusCode::OK, Json(response))
}

/// Re-read the persisted premium flag into the session
pub async fn refresh_session(
    State(state): State<AppState>,
    auth: AuthSession,
) -> impl IntoResponse {
    info!("GET /api/auth/session - user: {}", auth.session.username);

    match state.auth_service.refresh(&auth.session.token).await {
        Ok(session) => {
            (StatusCode::OK, Json(session_response(&state, session, auth.language))).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}

/// Mark the session's user as premium
pub async fn upgrade(State(state): State<AppState>, auth: AuthSession) -> impl IntoResponse {
    info!("POST /api/auth/upgrade - user: {}", auth.session.username);

    match state.auth_service.upgrade(&auth.session.token).await {
        Ok(session) => {
            (StatusCode::OK, Json(session_response(&state, session, auth.language))).into_response()
        }
        Err(e) => ApiError::from_domain(e, &state.localizer, auth.language).into_response(),
    }
}
