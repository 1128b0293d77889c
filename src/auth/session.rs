use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{SessionTokenGenerator, parse_token};
use crate::error::Result;
use crate::store::Store;
use crate::types::{Session, User};

/// Name of the cookie carrying the raw session token.
pub const SESSION_COOKIE: &str = "zarco_session";

/// Fixed session lifetime, matching the cookie Max-Age.
pub const SESSION_TTL_DAYS: i64 = 7;

const SESSION_TTL_SECONDS: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;

#[derive(Debug)]
pub enum SessionValidationError {
    InvalidToken,
    SessionExpired,
    InternalError,
}

pub struct ValidatedSession {
    pub session: Session,
    pub user: User,
}

/// Creates a session for `user_id` and returns it with the raw token that
/// goes into the cookie. The raw token is never persisted.
pub fn issue_session(store: &dyn Store, user_id: &str) -> Result<(Session, String)> {
    let generator = SessionTokenGenerator::new();
    let (raw_token, lookup, hash) = generator.generate()?;

    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        user_id: user_id.to_string(),
        created_at: now,
        expires_at: now + Duration::days(SESSION_TTL_DAYS),
        last_used_at: None,
    };

    store.create_session(&session)?;
    Ok((session, raw_token))
}

/// Validates a raw session token against the store.
/// Returns the session and its user on success.
pub fn validate_session(
    store: &dyn Store,
    raw_token: &str,
) -> std::result::Result<ValidatedSession, SessionValidationError> {
    let (lookup, _secret) =
        parse_token(raw_token).map_err(|_| SessionValidationError::InvalidToken)?;

    let session = store
        .get_session_by_lookup(&lookup)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    let generator = SessionTokenGenerator::new();
    if !generator
        .verify(raw_token, &session.token_hash)
        .map_err(|_| SessionValidationError::InternalError)?
    {
        return Err(SessionValidationError::InvalidToken);
    }

    if session.expires_at < Utc::now() {
        return Err(SessionValidationError::SessionExpired);
    }

    let user = store
        .get_user(&session.user_id)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    if let Err(e) = store.update_session_last_used(&session.id) {
        tracing::warn!("Failed to update session last_used_at: {e}");
    }

    Ok(ValidatedSession { session, user })
}

/// Extracts the raw session token from a request's Cookie header, if present.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Builds the Set-Cookie value that installs a session token.
#[must_use]
pub fn session_cookie(raw_token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={raw_token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the Set-Cookie value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
