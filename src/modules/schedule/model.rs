use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub create_date: DateTime<Utc>,
    pub create_by: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ScheduleListItem {
    pub id: i64,
    pub name: String,
    pub likes: i64,
}

// One filled slot of the weekly grid.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleSlot {
    pub day: i64,
    pub meal: i64,
    pub recipe_id: i64,
    pub recipe_name: String,
}
