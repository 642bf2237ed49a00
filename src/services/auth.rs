use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::AppState;

// =============================================================================
// BEARER AUTHENTICATION
// =============================================================================

/// The authenticated caller, inserted into request extensions by
/// `auth_middleware` for every protected route.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub token_exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Invalid Authorization format")]
    InvalidFormat,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has been invalidated")]
    BlacklistedToken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHeader => StatusCode::UNAUTHORIZED,
            Self::InvalidFormat => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::BlacklistedToken => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token.to_string())
}

/// Resolve the caller from the Authorization header: the token must not be
/// revoked, must verify, and must belong to an existing active account.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, AuthError> {
    let token = extract_bearer_token(headers)?;

    let revoked: Option<(String,)> = sqlx::query_as(
        "SELECT token FROM blacklisted_tokens WHERE token = ? AND expires_at > ?",
    )
    .bind(&token)
    .bind(Utc::now())
    .fetch_optional(&state.db)
    .await?;

    if revoked.is_some() {
        tracing::warn!(
            "revoked token used ending in ...{}",
            token.chars().rev().take(8).collect::<String>()
        );
        return Err(AuthError::BlacklistedToken);
    }

    let data = state
        .jwt_service
        .verify_access_token(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    let user_id: i64 = data
        .claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidToken)?;

    // The account may have been deleted or deactivated since issuance.
    let user: Option<(i64, String)> =
        sqlx::query_as("SELECT id, username FROM users WHERE id = ? AND is_active = 1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;

    let (user_id, username) = user.ok_or(AuthError::InvalidToken)?;

    Ok(AuthSession {
        user_id,
        username,
        token,
        token_exp: data.claims.exp,
    })
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    match authenticate(&state, req.headers()).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            Ok(next.run(req).await)
        }
        Err(error) => Err(error.into_response()),
    }
}

/// Revoke a token until its natural expiry; stale blacklist rows are swept on
/// the way through.
pub async fn revoke_token(
    state: &AppState,
    token: &str,
    token_exp: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM blacklisted_tokens WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(&state.db)
        .await?;

    let expires_at = DateTime::<Utc>::from_timestamp(token_exp, 0).unwrap_or_else(Utc::now);

    sqlx::query("INSERT OR IGNORE INTO blacklisted_tokens (token, expires_at) VALUES (?, ?)")
        .bind(token)
        .bind(expires_at)
        .execute(&state.db)
        .await?;

    Ok(())
}
