use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::crud::{RecipeCrud, RecipeError};
use super::schema::{
    CommentRequest, CommentView, LikeResponse, RecipeDetailResponse, RecipeListResponse,
    WizardConfirmResponse, WizardDetailsRequest, WizardDraftResponse, WizardIngredientsRequest,
    WizardPreparationRequest, WizardQuantitiesRequest, WizardStartRequest, WizardStartResponse,
};
use super::wizard::{DraftDetails, RecipeDraft};
use crate::services::access::is_creator;
use crate::services::auth::{authenticate, AuthSession};
use crate::services::images;
use crate::services::metrics::METRICS;
use crate::services::pagination::{ListQuery, Page};
use crate::AppState;

// =============================================================================
// GET /recipes - alphabetical listing, optional filter and "mine" scope
// =============================================================================

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<RecipeListResponse>>, RecipeError> {
    let viewer = if query.mine() {
        let session = authenticate(&state, &headers)
            .await
            .map_err(|_| RecipeError::AuthRequired)?;
        Some(session.user_id)
    } else {
        None
    };

    let crud = RecipeCrud::new(state.db.clone());
    let (items, total) = crud.list(&query, viewer).await?;

    Ok(Json(Page::new(
        items.into_iter().map(Into::into).collect(),
        query.page(),
        total,
        query.name_filter().is_some(),
    )))
}

// =============================================================================
// GET /recipes/{id} - open to anonymous visitors
// =============================================================================

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetailResponse>, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());

    let recipe = crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;
    let created_by = crud.creator_username(&recipe).await?;
    let ingredients = crud.ingredient_rows(id).await?;
    let likes = crud.like_count(id).await?;
    let comments = crud.comments(id).await?;

    Ok(Json(RecipeDetailResponse::assemble(
        recipe, created_by, ingredients, likes, comments,
    )))
}

// =============================================================================
// DELETE /recipes/{id} - creator only
// =============================================================================

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<StatusCode, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());
    let recipe = crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;

    if !is_creator(session.user_id, recipe.create_by) {
        return Err(RecipeError::NotCreator);
    }

    crud.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// POST /recipes/{id}/like, /recipes/{id}/unlike
// =============================================================================

pub async fn like(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;

    crud.like(id, session.user_id).await?;
    let likes = crud.like_count(id).await?;

    Ok(Json(LikeResponse { recipe_id: id, likes }))
}

pub async fn unlike(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;

    crud.unlike(id, session.user_id).await?;
    let likes = crud.like_count(id).await?;

    Ok(Json(LikeResponse { recipe_id: id, likes }))
}

// =============================================================================
// POST /recipes/{id}/comments, DELETE /recipes/{id}/comments/{comment_id}
// =============================================================================

pub async fn comment_add(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), RecipeError> {
    req.validate()?;

    let crud = RecipeCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;

    crud.add_comment(id, session.user_id, &req.comment).await?;

    // Newest first puts the fresh comment at the head.
    let mut comments = crud.comments(id).await?;
    let newest = comments.drain(..).next().ok_or(RecipeError::CommentNotFound)?;

    Ok((StatusCode::CREATED, Json(newest.into())))
}

pub async fn comment_delete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(RecipeError::NotFound)?;

    if !crud.delete_comment(id, comment_id, session.user_id).await? {
        return Err(RecipeError::CommentNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// WIZARD
// =============================================================================

// POST /recipes/wizard - open a draft; with recipe_id, preload for editing
pub async fn wizard_start(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<WizardStartRequest>,
) -> Result<(StatusCode, Json<WizardStartResponse>), RecipeError> {
    let mut draft = RecipeDraft::new(session.user_id);

    if let Some(recipe_id) = req.recipe_id {
        let crud = RecipeCrud::new(state.db.clone());
        let recipe = crud
            .find_by_id(recipe_id)
            .await?
            .ok_or(RecipeError::NotFound)?;

        if !is_creator(session.user_id, recipe.create_by) {
            return Err(RecipeError::NotCreator);
        }

        let rows = crud.ingredient_rows(recipe_id).await?;

        draft.recipe_id = Some(recipe_id);
        draft.set_selection(rows.iter().map(|row| row.ingredient_id).collect());
        draft.details = Some(DraftDetails {
            name: recipe.name,
            description: recipe.description,
            preparation_time: recipe.preparation_time,
            calories: recipe.calories,
            image: None,
        });
        draft.preparing = Some(recipe.preparing);
        draft.quantities = Some(
            rows.into_iter()
                .map(|row| (row.ingredient_id, row.quantity))
                .collect(),
        );
    }

    let draft_id = state.wizard.start(draft).await;

    Ok((
        StatusCode::CREATED,
        Json(WizardStartResponse { draft_id }),
    ))
}

// GET /recipes/wizard/{draft_id}
pub async fn wizard_get(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<WizardDraftResponse>, RecipeError> {
    let draft = state.wizard.fetch(draft_id, session.user_id).await?;
    Ok(Json(draft.into()))
}

// PUT /recipes/wizard/{draft_id}/ingredients - step 1
pub async fn wizard_ingredients(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
    Json(req): Json<WizardIngredientsRequest>,
) -> Result<Json<WizardDraftResponse>, RecipeError> {
    let crud = RecipeCrud::new(state.db.clone());
    if crud.missing_ingredients(&req.ingredient_ids).await? {
        return Err(RecipeError::UnknownIngredient);
    }

    let mut draft = state.wizard.fetch(draft_id, session.user_id).await?;
    draft.set_selection(req.ingredient_ids);
    state.wizard.store(draft.clone()).await;

    Ok(Json(draft.into()))
}

// PUT /recipes/wizard/{draft_id}/details - step 2
pub async fn wizard_details(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
    Json(req): Json<WizardDetailsRequest>,
) -> Result<Json<WizardDraftResponse>, RecipeError> {
    req.validate()?;

    let mut draft = state.wizard.fetch(draft_id, session.user_id).await?;

    if draft.selection.is_none() {
        return Err(RecipeError::StepIncomplete(1));
    }

    draft.details = Some(DraftDetails {
        name: req.name,
        description: req.description,
        preparation_time: req.preparation_time,
        calories: req.calories,
        image: req
            .image
            .as_deref()
            .map(|name| images::upload_path("recipe", name)),
    });
    state.wizard.store(draft.clone()).await;

    Ok(Json(draft.into()))
}

// PUT /recipes/wizard/{draft_id}/preparation - step 3
pub async fn wizard_preparation(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
    Json(req): Json<WizardPreparationRequest>,
) -> Result<Json<WizardDraftResponse>, RecipeError> {
    req.validate()?;

    let mut draft = state.wizard.fetch(draft_id, session.user_id).await?;

    if draft.details.is_none() {
        return Err(RecipeError::StepIncomplete(2));
    }

    draft.preparing = Some(req.preparing);
    state.wizard.store(draft.clone()).await;

    Ok(Json(draft.into()))
}

// PUT /recipes/wizard/{draft_id}/quantities - step 4
pub async fn wizard_quantities(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
    Json(req): Json<WizardQuantitiesRequest>,
) -> Result<Json<WizardDraftResponse>, RecipeError> {
    let mut draft = state.wizard.fetch(draft_id, session.user_id).await?;

    if draft.preparing.is_none() {
        return Err(RecipeError::StepIncomplete(3));
    }

    // A duplicated id would silently collapse in the map.
    let mut rows = BTreeMap::new();
    for row in req.rows {
        if rows.insert(row.ingredient_id, row.quantity).is_some() {
            return Err(RecipeError::QuantityMismatch);
        }
    }

    draft.set_quantities(rows)?;
    state.wizard.store(draft.clone()).await;

    Ok(Json(draft.into()))
}

// POST /recipes/wizard/{draft_id}/confirm - persist everything as one unit
pub async fn wizard_confirm(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<WizardConfirmResponse>, RecipeError> {
    let draft = state.wizard.fetch(draft_id, session.user_id).await?;
    draft.validate_complete()?;

    let crud = RecipeCrud::new(state.db.clone());

    let recipe_id = match draft.recipe_id {
        Some(recipe_id) => {
            // Re-check: the recipe may be gone or re-owned since the wizard
            // started.
            let recipe = crud
                .find_by_id(recipe_id)
                .await?
                .ok_or(RecipeError::NotFound)?;
            if !is_creator(session.user_id, recipe.create_by) {
                return Err(RecipeError::NotCreator);
            }

            crud.update_from_draft(recipe_id, &draft).await?;
            recipe_id
        }
        None => {
            let recipe_id = crud.create_from_draft(&draft).await?;
            METRICS.recipes_created.inc();
            recipe_id
        }
    };

    state.wizard.discard(draft_id, session.user_id).await?;

    tracing::info!(recipe_id, username = %session.username, "wizard confirmed");

    Ok(Json(WizardConfirmResponse { recipe_id }))
}

// DELETE /recipes/wizard/{draft_id} - abandon the draft
pub async fn wizard_cancel(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(draft_id): Path<Uuid>,
) -> Result<StatusCode, RecipeError> {
    state.wizard.discard(draft_id, session.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
