use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::model::Ingredient;
use super::schema::IngredientErrorResponse;
use crate::config::DbPool;
use crate::services::pagination::{ListQuery, PAGE_SIZE};

// =============================================================================
// INGREDIENT ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IngredientError {
    #[error("Ingredient not found")]
    NotFound,

    #[error("Ingredient already saved in the database")]
    NameTaken,

    #[error("Ingredient is used by at least one recipe and cannot be deleted")]
    InUse,

    #[error("Only the creator may modify an ingredient")]
    NotCreator,

    #[error("Login required")]
    AuthRequired,

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngredientError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NameTaken => StatusCode::CONFLICT,
            Self::InUse => StatusCode::CONFLICT,
            Self::NotCreator => StatusCode::FORBIDDEN,
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngredientError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(IngredientErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

// =============================================================================
// INGREDIENT CRUD
// =============================================================================

pub struct IngredientCrud {
    pool: DbPool,
}

impl IngredientCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        viewer: Option<i64>,
    ) -> Result<(Vec<Ingredient>, i64), IngredientError> {
        let filter = query.name_filter().unwrap_or("");
        let mine = query.mine();

        let items = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, create_by FROM ingredients
            WHERE (? = '' OR name LIKE '%' || ? || '%')
              AND (? = 0 OR create_by = ?)
            ORDER BY name
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filter)
        .bind(filter)
        .bind(mine)
        .bind(viewer)
        .bind(PAGE_SIZE)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM ingredients
            WHERE (? = '' OR name LIKE '%' || ? || '%')
              AND (? = 0 OR create_by = ?)
            "#,
        )
        .bind(filter)
        .bind(filter)
        .bind(mine)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total.0))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Ingredient>, IngredientError> {
        let ingredient =
            sqlx::query_as::<_, Ingredient>("SELECT id, name, create_by FROM ingredients WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(ingredient)
    }

    pub async fn create(&self, name: &str, create_by: i64) -> Result<i64, IngredientError> {
        let result = sqlx::query("INSERT INTO ingredients (name, create_by) VALUES (?, ?)")
            .bind(name)
            .bind(create_by)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(e) if e.to_string().contains("ingredients.name") => Err(IngredientError::NameTaken),
            Err(e) => Err(IngredientError::Database(e)),
        }
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<(), IngredientError> {
        let result = sqlx::query("UPDATE ingredients SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("ingredients.name") => Err(IngredientError::NameTaken),
            Err(e) => Err(IngredientError::Database(e)),
        }
    }

    pub async fn recipe_count(&self, id: i64) -> Result<i64, IngredientError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM recipe_ingredients WHERE ingredient_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    /// Refuses while any recipe still references the ingredient; the schema's
    /// RESTRICT rule backs this up should a recipe appear concurrently.
    pub async fn delete(&self, id: i64) -> Result<(), IngredientError> {
        if self.recipe_count(id).await? > 0 {
            return Err(IngredientError::InUse);
        }

        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("FOREIGN KEY constraint") => {
                Err(IngredientError::InUse)
            }
            Err(e) => Err(IngredientError::Database(e)),
        }
    }
}
