use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::config::DbPool;

// =============================================================================
// SINGLE-USE ACCOUNT TOKENS
// =============================================================================
//
// Opaque UUIDv4 credentials proving control of the registration email. A user
// has at most one live token; issuing again hands back the existing one.
// Redemption deletes the row in the same statement that looks it up, so two
// concurrent redemptions cannot both succeed.

/// Get-or-create the live token for a user.
pub async fn issue(pool: &DbPool, user_id: i64) -> Result<String, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT token FROM user_tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    if let Some((token,)) = existing {
        return Ok(token);
    }

    let token = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO user_tokens (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(token)
}

/// Syntactic well-formedness: the raw value must parse back to the exact
/// canonical UUID form it was issued in.
pub fn well_formed(raw: &str) -> bool {
    match Uuid::parse_str(raw) {
        Ok(parsed) => parsed.to_string() == raw,
        Err(_) => false,
    }
}

/// True only for a well-formed token that currently exists.
pub async fn validate(pool: &DbPool, raw: &str) -> Result<bool, sqlx::Error> {
    if !well_formed(raw) {
        return Ok(false);
    }

    let found: Option<(i64,)> =
        sqlx::query_as("SELECT user_id FROM user_tokens WHERE token = ?")
            .bind(raw)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

/// Atomically consume a token, returning the user it was bound to. The
/// DELETE doubles as the existence check: of two simultaneous redemptions at
/// most one gets the row back.
pub async fn redeem(
    conn: &mut SqliteConnection,
    raw: &str,
) -> Result<Option<i64>, sqlx::Error> {
    if !well_formed(raw) {
        return Ok(None);
    }

    let redeemed: Option<(i64,)> =
        sqlx::query_as::<Sqlite, (i64,)>("DELETE FROM user_tokens WHERE token = ? RETURNING user_id")
            .bind(raw)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(redeemed.map(|(user_id,)| user_id))
}
