use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::session::{clear_session_cookie, issue_session, session_cookie};
use crate::auth::{CurrentUser, MaybeUser, PasswordHasher};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{AuthStatusResponse, LoginRequest, RegisterRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{validate_display_name, validate_email, validate_password};
use crate::types::User;

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/status", get(status))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    validate_display_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let store = state.store.as_ref();
    let email = req.email.trim().to_lowercase();

    if store
        .get_user_by_email(&email)
        .api_err("Failed to check email")?
        .is_some()
    {
        return Err(ApiError::conflict("Email is already in use"));
    }

    let password_hash = PasswordHasher::new()
        .hash(&req.password)
        .api_err("Failed to hash password")?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        email,
        password_hash,
        created_at: now,
        updated_at: now,
    };

    match store.create_user(&user) {
        Ok(()) => {}
        // Lost the race against a concurrent registration for the same email.
        Err(Error::AlreadyExists) => return Err(ApiError::conflict("Email is already in use")),
        Err(e) => {
            tracing::error!("Failed to create user: {e}");
            return Err(ApiError::internal("Failed to create user"));
        }
    }

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let store = state.store.as_ref();
    let email = req.email.trim().to_lowercase();

    // A single message for unknown email and wrong password; the caller
    // cannot tell which one happened.
    let user = store
        .get_user_by_email(&email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let valid = PasswordHasher::new()
        .verify(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let (_session, raw_token) =
        issue_session(store, &user.id).api_err("Failed to create session")?;
    let cookie = session_cookie(&raw_token, state.secure_cookies);

    Ok::<_, ApiError>(([(SET_COOKIE, cookie)], Json(ApiResponse::success(user))))
}

async fn logout(auth: MaybeUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Clearing the cookie succeeds even if the session is already gone.
    if let Some(current) = auth.0 {
        state
            .store
            .delete_session(&current.session.id)
            .api_err("Failed to delete session")?;
    }

    let cookie = clear_session_cookie(state.secure_cookies);
    Ok::<_, ApiError>((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::success(serde_json::json!({ "success": true }))),
    ))
}

async fn me(auth: CurrentUser) -> impl IntoResponse {
    Json(ApiResponse::success(auth.user))
}

async fn status(auth: MaybeUser) -> impl IntoResponse {
    Json(ApiResponse::success(AuthStatusResponse {
        authenticated: auth.0.is_some(),
    }))
}
