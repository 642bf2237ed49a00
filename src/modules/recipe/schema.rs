use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::model::{Recipe, RecipeComment, RecipeIngredient, RecipeListItem};
use super::wizard::{DraftDetails, RecipeDraft};

// =============================================================================
// WIZARD REQUESTS
// =============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct WizardStartRequest {
    // Present when editing an existing recipe.
    #[serde(default)]
    pub recipe_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WizardIngredientsRequest {
    pub ingredient_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WizardDetailsRequest {
    #[validate(length(min = 1, max = 128, message = "Recipe name must be 1-128 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Preparation time must be at least one minute"))]
    pub preparation_time: i64,
    #[serde(default)]
    #[validate(range(min = 1, message = "Calories must be positive"))]
    pub calories: Option<i64>,
    // Original filename of an uploaded image; stored under a random name.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WizardPreparationRequest {
    #[validate(length(min = 1, message = "Preparation instructions are required"))]
    pub preparing: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRow {
    pub ingredient_id: i64,
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct WizardQuantitiesRequest {
    pub rows: Vec<QuantityRow>,
}

// =============================================================================
// WIZARD RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct WizardStartResponse {
    pub draft_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DraftDetailsView {
    pub name: String,
    pub description: Option<String>,
    pub preparation_time: i64,
    pub calories: Option<i64>,
    pub image: Option<String>,
}

impl From<DraftDetails> for DraftDetailsView {
    fn from(d: DraftDetails) -> Self {
        Self {
            name: d.name,
            description: d.description,
            preparation_time: d.preparation_time,
            calories: d.calories,
            image: d.image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuantityRowView {
    pub ingredient_id: i64,
    pub quantity: String,
}

#[derive(Debug, Serialize)]
pub struct WizardDraftResponse {
    pub draft_id: Uuid,
    pub recipe_id: Option<i64>,
    pub ingredients: Option<Vec<i64>>,
    pub details: Option<DraftDetailsView>,
    pub preparing: Option<String>,
    pub quantities: Option<Vec<QuantityRowView>>,
    pub complete: bool,
}

impl From<RecipeDraft> for WizardDraftResponse {
    fn from(draft: RecipeDraft) -> Self {
        let complete = draft.validate_complete().is_ok();
        Self {
            draft_id: draft.id,
            recipe_id: draft.recipe_id,
            ingredients: draft.selection,
            details: draft.details.map(Into::into),
            preparing: draft.preparing,
            quantities: draft.quantities.map(|rows| {
                rows.into_iter()
                    .map(|(ingredient_id, quantity)| QuantityRowView {
                        ingredient_id,
                        quantity,
                    })
                    .collect()
            }),
            complete,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WizardConfirmResponse {
    pub recipe_id: i64,
}

// =============================================================================
// LISTING / DETAIL
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub preparation_time: i64,
    pub likes: i64,
}

impl From<RecipeListItem> for RecipeListResponse {
    fn from(r: RecipeListItem) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image: r.image,
            preparation_time: r.preparation_time,
            likes: r.likes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientView {
    pub ingredient_id: i64,
    pub name: String,
    pub quantity: String,
}

impl From<RecipeIngredient> for RecipeIngredientView {
    fn from(row: RecipeIngredient) -> Self {
        Self {
            ingredient_id: row.ingredient_id,
            name: row.name,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub username: String,
    pub comment: String,
    pub date_added: DateTime<Utc>,
}

impl From<RecipeComment> for CommentView {
    fn from(c: RecipeComment) -> Self {
        Self {
            id: c.id,
            username: c.username,
            comment: c.comment,
            date_added: c.date_added,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub preparing: String,
    pub create_date: DateTime<Utc>,
    pub preparation_time: i64,
    pub calories: Option<i64>,
    pub image: String,
    pub created_by: Option<String>,
    pub ingredients: Vec<RecipeIngredientView>,
    pub likes: i64,
    pub comments: Vec<CommentView>,
}

impl RecipeDetailResponse {
    pub fn assemble(
        recipe: Recipe,
        created_by: Option<String>,
        ingredients: Vec<RecipeIngredient>,
        likes: i64,
        comments: Vec<RecipeComment>,
    ) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            description: recipe.description,
            preparing: recipe.preparing,
            create_date: recipe.create_date,
            preparation_time: recipe.preparation_time,
            calories: recipe.calories,
            image: recipe.image,
            created_by,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            likes,
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// INTERACTIONS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub recipe_id: i64,
    pub likes: i64,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RecipeErrorResponse {
    pub error: String,
}

impl RecipeErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
