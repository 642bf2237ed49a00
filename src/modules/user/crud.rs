use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::model::{AccountState, LikedRecipe, OwnComment, User};
use super::schema::ErrorResponse;
use crate::config::DbPool;
use crate::services::pagination::{ListQuery, PAGE_SIZE};
use crate::services::token;

// =============================================================================
// USER ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("No user with that username")]
    UnknownUsername,

    #[error("No user with that email address")]
    UnknownEmail,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Account is not active yet. Check your mailbox for the activation link")]
    AccountInactive,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Your link is invalid or malformed")]
    BadLink,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownUsername => StatusCode::UNAUTHORIZED,
            Self::UnknownEmail => StatusCode::BAD_REQUEST,
            Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::AccountInactive => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::BadLink => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// =============================================================================
// USER CRUD
// =============================================================================

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

pub struct UserCrud {
    pool: DbPool,
}

impl UserCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewUser) -> Result<i64, UserError> {
        let avatar = new
            .avatar
            .clone()
            .unwrap_or_else(|| "images/user/default.png".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, is_active, avatar, date_joined)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(&avatar)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(e) => {
                // Race with a concurrent registration: the UNIQUE constraint
                // tells us which field collided.
                let err_str = e.to_string();
                if err_str.contains("users.username") {
                    Err(UserError::UsernameTaken)
                } else if err_str.contains("users.email") {
                    Err(UserError::EmailTaken)
                } else {
                    Err(UserError::Database(e))
                }
            }
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn username_taken(&self, username: &str, exclude: Option<i64>) -> Result<bool, UserError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE username = ? AND id != COALESCE(?, -1)",
        )
        .bind(username)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0 > 0)
    }

    pub async fn email_taken(&self, email: &str, exclude: Option<i64>) -> Result<bool, UserError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE email = ? AND id != COALESCE(?, -1)",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// Redeem an activation token and flip the account active, atomically.
    /// Returns false when the token does not exist (nothing changes).
    pub async fn activate_with_token(&self, raw: &str) -> Result<bool, UserError> {
        let mut tx = self.pool.begin().await?;

        let Some(user_id) = token::redeem(&mut *tx, raw).await? else {
            return Ok(false);
        };

        sqlx::query("UPDATE users SET is_active = 1 WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Redeem a password-set token and store the new hash, atomically.
    pub async fn set_password_with_token(&self, raw: &str, password_hash: &str) -> Result<bool, UserError> {
        let mut tx = self.pool.begin().await?;

        let Some(user_id) = token::redeem(&mut *tx, raw).await? else {
            return Ok(false);
        };

        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), UserError> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        avatar: Option<&str>,
    ) -> Result<(), UserError> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, first_name = ?, last_name = ?,
                avatar = COALESCE(?, avatar)
            WHERE id = ?
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(avatar)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_last_login(&self, user_id: i64) -> Result<(), UserError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deleting the row is enough: the schema cascades the token, comments
    /// and likes away and nulls the creator on recipes, ingredients and
    /// schedules.
    pub async fn delete(&self, user_id: i64) -> Result<(), UserError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn account_state(&self, user_id: i64) -> Result<AccountState, UserError> {
        let row: Option<(bool, Option<String>)> = sqlx::query_as(
            r#"
            SELECT u.is_active, t.token
            FROM users u
            LEFT JOIN user_tokens t ON t.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let (is_active, token) = row.ok_or(UserError::NotFound)?;

        Ok(if is_active {
            AccountState::Active { token }
        } else {
            AccountState::Inactive { token }
        })
    }

    pub async fn panel_counts(&self, user_id: i64) -> Result<(i64, i64, i64, i64), UserError> {
        let recipes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE create_by = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let schedules: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schedules WHERE create_by = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let comments: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe_comments WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let likes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe_likes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((recipes.0, schedules.0, comments.0, likes.0))
    }

    /// The caller's own comments, newest first, optionally filtered by the
    /// name of the recipe they were left on.
    pub async fn own_comments(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> Result<(Vec<OwnComment>, i64), UserError> {
        let filter = query.name_filter().unwrap_or("");

        let items = sqlx::query_as::<_, OwnComment>(
            r#"
            SELECT c.id, c.recipe_id, r.name AS recipe_name, c.comment, c.date_added
            FROM recipe_comments c
            JOIN recipes r ON r.id = c.recipe_id
            WHERE c.user_id = ? AND (? = '' OR r.name LIKE '%' || ? || '%')
            ORDER BY c.date_added DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(filter)
        .bind(filter)
        .bind(PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM recipe_comments c
            JOIN recipes r ON r.id = c.recipe_id
            WHERE c.user_id = ? AND (? = '' OR r.name LIKE '%' || ? || '%')
            "#,
        )
        .bind(user_id)
        .bind(filter)
        .bind(filter)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total.0))
    }

    pub async fn liked_recipes(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> Result<(Vec<LikedRecipe>, i64), UserError> {
        let filter = query.name_filter().unwrap_or("");

        let items = sqlx::query_as::<_, LikedRecipe>(
            r#"
            SELECT r.id, r.name, r.image
            FROM recipe_likes l
            JOIN recipes r ON r.id = l.recipe_id
            WHERE l.user_id = ? AND (? = '' OR r.name LIKE '%' || ? || '%')
            ORDER BY r.name, r.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(filter)
        .bind(filter)
        .bind(PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM recipe_likes l
            JOIN recipes r ON r.id = l.recipe_id
            WHERE l.user_id = ? AND (? = '' OR r.name LIKE '%' || ? || '%')
            "#,
        )
        .bind(user_id)
        .bind(filter)
        .bind(filter)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total.0))
    }
}
