use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::model::{Schedule, ScheduleListItem, ScheduleSlot};
use super::schema::ScheduleErrorResponse;
use crate::config::DbPool;
use crate::services::pagination::{ListQuery, PAGE_SIZE};

// =============================================================================
// SCHEDULE ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Schedule not found")]
    NotFound,

    #[error("Only the creator may modify a schedule")]
    NotCreator,

    #[error("Login required")]
    AuthRequired,

    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("That slot is empty")]
    SlotEmpty,

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ScheduleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotCreator => StatusCode::FORBIDDEN,
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::RecipeNotFound => StatusCode::BAD_REQUEST,
            Self::SlotEmpty => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ScheduleErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

// =============================================================================
// SCHEDULE CRUD
// =============================================================================

pub struct ScheduleCrud {
    pool: DbPool,
}

impl ScheduleCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        viewer: Option<i64>,
    ) -> Result<(Vec<ScheduleListItem>, i64), ScheduleError> {
        let filter = query.name_filter().unwrap_or("");
        let mine = query.mine();

        let items = sqlx::query_as::<_, ScheduleListItem>(
            r#"
            SELECT s.id, s.name,
                   (SELECT COUNT(*) FROM schedule_likes l WHERE l.schedule_id = s.id) AS likes
            FROM schedules s
            WHERE (? = '' OR s.name LIKE '%' || ? || '%')
              AND (? = 0 OR s.create_by = ?)
            ORDER BY s.name, s.id
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
            SELECT COUNT(*) FROM schedules
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

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Schedule>, ScheduleError> {
        let schedule = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(schedule)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        create_by: i64,
    ) -> Result<i64, ScheduleError> {
        let result = sqlx::query(
            "INSERT INTO schedules (name, description, create_date, create_by) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(create_by)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), ScheduleError> {
        sqlx::query("UPDATE schedules SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ScheduleError> {
        sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The filled slots of the weekly grid, in day/meal order.
    pub async fn slots(&self, schedule_id: i64) -> Result<Vec<ScheduleSlot>, ScheduleError> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(
            r#"
            SELECT sr.day, sr.meal, sr.recipe_id, r.name AS recipe_name
            FROM schedule_recipes sr
            JOIN recipes r ON r.id = sr.recipe_id
            WHERE sr.schedule_id = ?
            ORDER BY sr.day, sr.meal
            "#,
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// Upsert: a slot holds at most one recipe, assigning again replaces it.
    pub async fn set_slot(
        &self,
        schedule_id: i64,
        day: i64,
        meal: i64,
        recipe_id: i64,
    ) -> Result<(), ScheduleError> {
        sqlx::query(
            r#"
            INSERT INTO schedule_recipes (schedule_id, recipe_id, day, meal)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (schedule_id, day, meal) DO UPDATE SET recipe_id = excluded.recipe_id
            "#,
        )
        .bind(schedule_id)
        .bind(recipe_id)
        .bind(day)
        .bind(meal)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_slot(
        &self,
        schedule_id: i64,
        day: i64,
        meal: i64,
    ) -> Result<bool, ScheduleError> {
        let result =
            sqlx::query("DELETE FROM schedule_recipes WHERE schedule_id = ? AND day = ? AND meal = ?")
                .bind(schedule_id)
                .bind(day)
                .bind(meal)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn like_count(&self, schedule_id: i64) -> Result<i64, ScheduleError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM schedule_likes WHERE schedule_id = ?")
                .bind(schedule_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    pub async fn like(&self, schedule_id: i64, user_id: i64) -> Result<(), ScheduleError> {
        sqlx::query("INSERT OR IGNORE INTO schedule_likes (schedule_id, user_id) VALUES (?, ?)")
            .bind(schedule_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn unlike(&self, schedule_id: i64, user_id: i64) -> Result<(), ScheduleError> {
        sqlx::query("DELETE FROM schedule_likes WHERE schedule_id = ? AND user_id = ?")
            .bind(schedule_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn recipe_exists(&self, recipe_id: i64) -> Result<bool, ScheduleError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
