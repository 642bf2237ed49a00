use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub avatar: String,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Account lifecycle joined with the presence of a live single-use token:
/// one value answers both "may this user log in" and "which link should a
/// reset request email out".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    Inactive { token: Option<String> },
    Active { token: Option<String> },
}

impl AccountState {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Inactive { token } | Self::Active { token } => token.as_deref(),
        }
    }
}

// A comment of the caller's, joined with the recipe it was left on.
#[derive(Debug, Clone, FromRow)]
pub struct OwnComment {
    pub id: i64,
    pub recipe_id: i64,
    pub recipe_name: String,
    pub comment: String,
    pub date_added: DateTime<Utc>,
}

// A recipe the caller liked.
#[derive(Debug, Clone, FromRow)]
pub struct LikedRecipe {
    pub id: i64,
    pub name: String,
    pub image: String,
}
