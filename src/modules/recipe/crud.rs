use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::model::{Recipe, RecipeComment, RecipeIngredient, RecipeListItem};
use super::schema::RecipeErrorResponse;
use super::wizard::{reconcile, IngredientRowRef, RecipeDraft};
use crate::config::DbPool;
use crate::services::pagination::{ListQuery, PAGE_SIZE};

// =============================================================================
// RECIPE ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Recipe not found")]
    NotFound,

    #[error("Only the creator may modify a recipe")]
    NotCreator,

    #[error("Login required")]
    AuthRequired,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Wizard draft not found")]
    DraftNotFound,

    #[error("Step {0} of the wizard is not complete")]
    StepIncomplete(u8),

    #[error("Quantity rows must match the selected ingredients exactly")]
    QuantityMismatch,

    #[error("Each selected ingredient needs a quantity")]
    QuantityMissing,

    #[error("Unknown ingredient in selection")]
    UnknownIngredient,

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RecipeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotCreator => StatusCode::FORBIDDEN,
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::CommentNotFound => StatusCode::NOT_FOUND,
            Self::DraftNotFound => StatusCode::NOT_FOUND,
            Self::StepIncomplete(_) => StatusCode::BAD_REQUEST,
            Self::QuantityMismatch => StatusCode::BAD_REQUEST,
            Self::QuantityMissing => StatusCode::BAD_REQUEST,
            Self::UnknownIngredient => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(RecipeErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

// =============================================================================
// RECIPE CRUD
// =============================================================================

pub struct RecipeCrud {
    pool: DbPool,
}

impl RecipeCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        viewer: Option<i64>,
    ) -> Result<(Vec<RecipeListItem>, i64), RecipeError> {
        let filter = query.name_filter().unwrap_or("");
        let mine = query.mine();

        let items = sqlx::query_as::<_, RecipeListItem>(
            r#"
            SELECT r.id, r.name, r.image, r.preparation_time,
                   (SELECT COUNT(*) FROM recipe_likes l WHERE l.recipe_id = r.id) AS likes
            FROM recipes r
            WHERE (? = '' OR r.name LIKE '%' || ? || '%')
              AND (? = 0 OR r.create_by = ?)
            ORDER BY r.name, r.id
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
            SELECT COUNT(*) FROM recipes
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

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>, RecipeError> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    pub async fn creator_username(&self, recipe: &Recipe) -> Result<Option<String>, RecipeError> {
        let Some(user_id) = recipe.create_by else {
            return Ok(None);
        };

        let row: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(username,)| username))
    }

    pub async fn ingredient_rows(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>, RecipeError> {
        let rows = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT ri.ingredient_id, i.name, ri.quantity
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ?
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn like_count(&self, recipe_id: i64) -> Result<i64, RecipeError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe_likes WHERE recipe_id = ?")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Comments newest first.
    pub async fn comments(&self, recipe_id: i64) -> Result<Vec<RecipeComment>, RecipeError> {
        let comments = sqlx::query_as::<_, RecipeComment>(
            r#"
            SELECT c.id, u.username, c.comment, c.date_added
            FROM recipe_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.recipe_id = ?
            ORDER BY c.date_added DESC, c.id DESC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn delete(&self, recipe_id: i64) -> Result<(), RecipeError> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // LIKES / COMMENTS
    // =========================================================================

    /// Liking is a set insert: doing it twice changes nothing.
    pub async fn like(&self, recipe_id: i64, user_id: i64) -> Result<(), RecipeError> {
        sqlx::query("INSERT OR IGNORE INTO recipe_likes (recipe_id, user_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removing an absent like is a no-op.
    pub async fn unlike(&self, recipe_id: i64, user_id: i64) -> Result<(), RecipeError> {
        sqlx::query("DELETE FROM recipe_likes WHERE recipe_id = ? AND user_id = ?")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_comment(
        &self,
        recipe_id: i64,
        user_id: i64,
        comment: &str,
    ) -> Result<i64, RecipeError> {
        let result = sqlx::query(
            "INSERT INTO recipe_comments (recipe_id, user_id, comment, date_added) VALUES (?, ?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(comment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Only the commenter may remove their own entry.
    pub async fn delete_comment(
        &self,
        recipe_id: i64,
        comment_id: i64,
        user_id: i64,
    ) -> Result<bool, RecipeError> {
        let result = sqlx::query(
            "DELETE FROM recipe_comments WHERE id = ? AND recipe_id = ? AND user_id = ?",
        )
        .bind(comment_id)
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // WIZARD PERSISTENCE
    // =========================================================================

    pub async fn missing_ingredients(&self, ids: &[i64]) -> Result<bool, RecipeError> {
        for id in ids {
            let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            if found.is_none() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Persist a completed create-mode draft: the recipe row and every
    /// ingredient row land in one transaction.
    pub async fn create_from_draft(&self, draft: &RecipeDraft) -> Result<i64, RecipeError> {
        draft.validate_complete()?;

        let details = draft.details.as_ref().expect("validated");
        let preparing = draft.preparing.as_ref().expect("validated");
        let quantities = draft.quantities.as_ref().expect("validated");

        let mut tx = self.pool.begin().await?;

        let image = details
            .image
            .clone()
            .unwrap_or_else(|| "images/recipe/default.png".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (name, description, preparing, create_date, preparation_time, calories, image, create_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&details.name)
        .bind(&details.description)
        .bind(preparing)
        .bind(Utc::now())
        .bind(details.preparation_time)
        .bind(details.calories)
        .bind(&image)
        .bind(draft.user_id)
        .execute(&mut *tx)
        .await?;

        let recipe_id = result.last_insert_rowid();

        for (ingredient_id, quantity) in quantities {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(recipe_id)
            .bind(ingredient_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(recipe_id)
    }

    /// Persist a completed edit-mode draft. The stored rows are re-read and
    /// reconciled against the draft's selection inside the transaction, so
    /// the result matches the selection exactly no matter what changed since
    /// the wizard started.
    pub async fn update_from_draft(&self, recipe_id: i64, draft: &RecipeDraft) -> Result<(), RecipeError> {
        draft.validate_complete()?;

        let details = draft.details.as_ref().expect("validated");
        let preparing = draft.preparing.as_ref().expect("validated");
        let quantities = draft.quantities.as_ref().expect("validated");
        let selection = draft.selection.as_deref().expect("validated");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = ?, description = ?, preparing = ?, preparation_time = ?,
                calories = ?, image = COALESCE(?, image)
            WHERE id = ?
            "#,
        )
        .bind(&details.name)
        .bind(&details.description)
        .bind(preparing)
        .bind(details.preparation_time)
        .bind(details.calories)
        .bind(&details.image)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        let existing: Vec<IngredientRowRef> = sqlx::query_as::<_, (i64, String)>(
            "SELECT ingredient_id, quantity FROM recipe_ingredients WHERE recipe_id = ?",
        )
        .bind(recipe_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(ingredient_id, quantity)| IngredientRowRef {
            ingredient_id,
            quantity,
        })
        .collect();

        let old_ids: Vec<i64> = existing.iter().map(|row| row.ingredient_id).collect();
        let plan = reconcile(&old_ids, selection, &existing);

        for ingredient_id in &plan.delete {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ? AND ingredient_id = ?")
                .bind(recipe_id)
                .bind(ingredient_id)
                .execute(&mut *tx)
                .await?;
        }

        for row in &plan.keep {
            let quantity = quantities
                .get(&row.ingredient_id)
                .cloned()
                .unwrap_or_else(|| row.quantity.clone());
            sqlx::query(
                "UPDATE recipe_ingredients SET quantity = ? WHERE recipe_id = ? AND ingredient_id = ?",
            )
            .bind(quantity)
            .bind(recipe_id)
            .bind(row.ingredient_id)
            .execute(&mut *tx)
            .await?;
        }

        for ingredient_id in &plan.create {
            let quantity = quantities.get(ingredient_id).cloned().unwrap_or_default();
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(recipe_id)
            .bind(ingredient_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
