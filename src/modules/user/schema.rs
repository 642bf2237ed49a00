use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::{LikedRecipe, OwnComment, User};

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 128, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,
    pub password: String,
    pub password_repeat: String,
    // Original filename of an uploaded avatar; stored under a random name.
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
}

// =============================================================================
// LOGIN / LOGOUT
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

// =============================================================================
// ACTIVATION / PASSWORD SET (token links)
// =============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordSetRequest {
    pub password_new: String,
    pub password_repeat: String,
}

// =============================================================================
// PROFILE / PASSWORD MAINTENANCE
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdateRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 128, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordUpdateRequest {
    pub password: String,
    pub password_new: String,
    pub password_repeat: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub avatar: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            avatar: user.avatar,
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub user: UserResponse,
    pub recipes: i64,
    pub schedules: i64,
    pub comments: i64,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OwnCommentResponse {
    pub id: i64,
    pub recipe_id: i64,
    pub recipe_name: String,
    pub comment: String,
    pub date_added: DateTime<Utc>,
}

impl From<OwnComment> for OwnCommentResponse {
    fn from(c: OwnComment) -> Self {
        Self {
            id: c.id,
            recipe_id: c.recipe_id,
            recipe_name: c.recipe_name,
            comment: c.comment,
            date_added: c.date_added,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikedRecipeResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
}

impl From<LikedRecipe> for LikedRecipeResponse {
    fn from(r: LikedRecipe) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image: r.image,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
