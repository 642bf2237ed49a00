use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::Ingredient;

#[derive(Debug, Deserialize, Validate)]
pub struct IngredientRequest {
    #[validate(length(min = 1, max = 128, message = "Ingredient name must be 1-128 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub create_by: Option<i64>,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            create_by: i.create_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientErrorResponse {
    pub error: String,
}

impl IngredientErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
