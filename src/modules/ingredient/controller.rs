use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use super::crud::{IngredientCrud, IngredientError};
use super::schema::{IngredientRequest, IngredientResponse};
use crate::services::access::is_creator;
use crate::services::auth::{authenticate, AuthSession};
use crate::services::pagination::{ListQuery, Page};
use crate::AppState;

// =============================================================================
// GET /ingredients - alphabetical listing, optional filter and "mine" scope
// =============================================================================

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<IngredientResponse>>, IngredientError> {
    let viewer = if query.mine() {
        let session = authenticate(&state, &headers)
            .await
            .map_err(|_| IngredientError::AuthRequired)?;
        Some(session.user_id)
    } else {
        None
    };

    let crud = IngredientCrud::new(state.db.clone());
    let (items, total) = crud.list(&query, viewer).await?;

    Ok(Json(Page::new(
        items.into_iter().map(Into::into).collect(),
        query.page(),
        total,
        query.name_filter().is_some(),
    )))
}

// =============================================================================
// GET /ingredients/{id}
// =============================================================================

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, IngredientError> {
    let crud = IngredientCrud::new(state.db.clone());
    let ingredient = crud.find_by_id(id).await?.ok_or(IngredientError::NotFound)?;

    Ok(Json(ingredient.into()))
}

// =============================================================================
// POST /ingredients
// =============================================================================

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<IngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), IngredientError> {
    req.validate()?;

    let crud = IngredientCrud::new(state.db.clone());
    let id = crud.create(&req.name, session.user_id).await?;
    let ingredient = crud.find_by_id(id).await?.ok_or(IngredientError::NotFound)?;

    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

// =============================================================================
// PUT /ingredients/{id} - creator only
// =============================================================================

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<IngredientRequest>,
) -> Result<Json<IngredientResponse>, IngredientError> {
    req.validate()?;

    let crud = IngredientCrud::new(state.db.clone());
    let ingredient = crud.find_by_id(id).await?.ok_or(IngredientError::NotFound)?;

    if !is_creator(session.user_id, ingredient.create_by) {
        return Err(IngredientError::NotCreator);
    }

    crud.rename(id, &req.name).await?;
    let ingredient = crud.find_by_id(id).await?.ok_or(IngredientError::NotFound)?;

    Ok(Json(ingredient.into()))
}

// =============================================================================
// DELETE /ingredients/{id} - creator only, refused while referenced
// =============================================================================

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<StatusCode, IngredientError> {
    let crud = IngredientCrud::new(state.db.clone());
    let ingredient = crud.find_by_id(id).await?.ok_or(IngredientError::NotFound)?;

    if !is_creator(session.user_id, ingredient.create_by) {
        return Err(IngredientError::NotCreator);
    }

    crud.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
