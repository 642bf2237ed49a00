use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::{Schedule, ScheduleListItem, ScheduleSlot};

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleRequest {
    #[validate(length(min = 1, max = 128, message = "Schedule name must be 1-128 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SlotRequest {
    #[validate(range(min = 1, max = 7, message = "Day must be between 1 and 7"))]
    pub day: i64,
    #[validate(range(min = 1, max = 5, message = "Meal must be between 1 and 5"))]
    pub meal: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SlotClearQuery {
    #[validate(range(min = 1, max = 7, message = "Day must be between 1 and 7"))]
    pub day: i64,
    #[validate(range(min = 1, max = 5, message = "Meal must be between 1 and 5"))]
    pub meal: i64,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub create_date: DateTime<Utc>,
    pub create_by: Option<i64>,
}

impl From<Schedule> for ScheduleResponse {
    fn from(s: Schedule) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            create_date: s.create_date,
            create_by: s.create_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleListResponse {
    pub id: i64,
    pub name: String,
    pub likes: i64,
}

impl From<ScheduleListItem> for ScheduleListResponse {
    fn from(s: ScheduleListItem) -> Self {
        Self {
            id: s.id,
            name: s.name,
            likes: s.likes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub day: i64,
    pub meal: i64,
    pub recipe_id: i64,
    pub recipe_name: String,
}

impl From<ScheduleSlot> for SlotView {
    fn from(s: ScheduleSlot) -> Self {
        Self {
            day: s.day,
            meal: s.meal,
            recipe_id: s.recipe_id,
            recipe_name: s.recipe_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleDetailResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub create_date: DateTime<Utc>,
    pub create_by: Option<i64>,
    pub slots: Vec<SlotView>,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct ScheduleLikeResponse {
    pub schedule_id: i64,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct ScheduleErrorResponse {
    pub error: String,
}

impl ScheduleErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
