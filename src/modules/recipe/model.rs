use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub preparing: String,
    pub create_date: DateTime<Utc>,
    pub preparation_time: i64,       // minutes
    pub calories: Option<i64>,
    pub image: String,
    pub create_by: Option<i64>,
}

// Listing row with its like count.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeListItem {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub preparation_time: i64,
    pub likes: i64,
}

// An ingredient-quantity row joined with the ingredient name.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeIngredient {
    pub ingredient_id: i64,
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeComment {
    pub id: i64,
    pub username: String,
    pub comment: String,
    pub date_added: DateTime<Utc>,
}
