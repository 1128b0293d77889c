use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::session::{
    SessionValidationError, session_token_from_headers, validate_session,
};
use crate::server::AppState;
use crate::types::{Session, User};

/// Extractor that requires an authenticated session.
pub struct CurrentUser {
    pub session: Session,
    pub user: User,
}

/// Extractor that resolves the session if one is present but never rejects.
pub struct MaybeUser(pub Option<CurrentUser>);

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    InvalidSession,
    SessionExpired,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingSession => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
            AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        (status, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw_token =
            session_token_from_headers(&parts.headers).ok_or(AuthError::MissingSession)?;

        let validated =
            validate_session(state.store.as_ref(), &raw_token).map_err(|e| match e {
                SessionValidationError::InvalidToken => AuthError::InvalidSession,
                SessionValidationError::SessionExpired => AuthError::SessionExpired,
                SessionValidationError::InternalError => AuthError::InternalError,
            })?;

        Ok(CurrentUser {
            session: validated.session,
            user: validated.user,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(current) => Ok(MaybeUser(Some(current))),
            Err(AuthError::InternalError) => Err(AuthError::InternalError),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}
