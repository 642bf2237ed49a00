use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub create_by: Option<i64>,
}
