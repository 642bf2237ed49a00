use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use super::crud::{ScheduleCrud, ScheduleError};
use super::schema::{
    ScheduleDetailResponse, ScheduleLikeResponse, ScheduleListResponse, ScheduleRequest,
    ScheduleResponse, SlotClearQuery, SlotRequest,
};
use crate::services::access::is_creator;
use crate::services::auth::{authenticate, AuthSession};
use crate::services::metrics::METRICS;
use crate::services::pagination::{ListQuery, Page};
use crate::AppState;

// =============================================================================
// GET /schedules
// =============================================================================

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Page<ScheduleListResponse>>, ScheduleError> {
    let viewer = if query.mine() {
        let session = authenticate(&state, &headers)
            .await
            .map_err(|_| ScheduleError::AuthRequired)?;
        Some(session.user_id)
    } else {
        None
    };

    let crud = ScheduleCrud::new(state.db.clone());
    let (items, total) = crud.list(&query, viewer).await?;

    Ok(Json(Page::new(
        items.into_iter().map(Into::into).collect(),
        query.page(),
        total,
        query.name_filter().is_some(),
    )))
}

// =============================================================================
// GET /schedules/{id} - plan details with the day/meal grid
// =============================================================================

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleDetailResponse>, ScheduleError> {
    let crud = ScheduleCrud::new(state.db.clone());

    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;
    let slots = crud.slots(id).await?;
    let likes = crud.like_count(id).await?;

    Ok(Json(ScheduleDetailResponse {
        id: schedule.id,
        name: schedule.name,
        description: schedule.description,
        create_date: schedule.create_date,
        create_by: schedule.create_by,
        slots: slots.into_iter().map(Into::into).collect(),
        likes,
    }))
}

// =============================================================================
// POST /schedules
// =============================================================================

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ScheduleError> {
    req.validate()?;

    let crud = ScheduleCrud::new(state.db.clone());
    let id = crud
        .create(&req.name, req.description.as_deref(), session.user_id)
        .await?;

    METRICS.schedules_created.inc();

    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;
    Ok((StatusCode::CREATED, Json(schedule.into())))
}

// =============================================================================
// PUT /schedules/{id} - creator only
// =============================================================================

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ScheduleError> {
    req.validate()?;

    let crud = ScheduleCrud::new(state.db.clone());
    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    if !is_creator(session.user_id, schedule.create_by) {
        return Err(ScheduleError::NotCreator);
    }

    crud.update(id, &req.name, req.description.as_deref()).await?;

    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;
    Ok(Json(schedule.into()))
}

// =============================================================================
// DELETE /schedules/{id} - creator only
// =============================================================================

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ScheduleError> {
    let crud = ScheduleCrud::new(state.db.clone());
    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    if !is_creator(session.user_id, schedule.create_by) {
        return Err(ScheduleError::NotCreator);
    }

    crud.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PUT /schedules/{id}/slots - assign a recipe to a (day, meal) slot
// =============================================================================

pub async fn set_slot(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<SlotRequest>,
) -> Result<Json<ScheduleDetailResponse>, ScheduleError> {
    req.validate()?;

    let crud = ScheduleCrud::new(state.db.clone());
    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    if !is_creator(session.user_id, schedule.create_by) {
        return Err(ScheduleError::NotCreator);
    }

    if !crud.recipe_exists(req.recipe_id).await? {
        return Err(ScheduleError::RecipeNotFound);
    }

    crud.set_slot(id, req.day, req.meal, req.recipe_id).await?;

    detail(State(state), Path(id)).await
}

// =============================================================================
// DELETE /schedules/{id}/slots?day=&meal= - clear a slot
// =============================================================================

pub async fn clear_slot(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Query(query): Query<SlotClearQuery>,
) -> Result<StatusCode, ScheduleError> {
    query.validate()?;

    let crud = ScheduleCrud::new(state.db.clone());
    let schedule = crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    if !is_creator(session.user_id, schedule.create_by) {
        return Err(ScheduleError::NotCreator);
    }

    if !crud.clear_slot(id, query.day, query.meal).await? {
        return Err(ScheduleError::SlotEmpty);
    }

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// POST /schedules/{id}/like, /schedules/{id}/unlike
// =============================================================================

pub async fn like(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleLikeResponse>, ScheduleError> {
    let crud = ScheduleCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    crud.like(id, session.user_id).await?;
    let likes = crud.like_count(id).await?;

    Ok(Json(ScheduleLikeResponse {
        schedule_id: id,
        likes,
    }))
}

pub async fn unlike(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleLikeResponse>, ScheduleError> {
    let crud = ScheduleCrud::new(state.db.clone());
    crud.find_by_id(id).await?.ok_or(ScheduleError::NotFound)?;

    crud.unlike(id, session.user_id).await?;
    let likes = crud.like_count(id).await?;

    Ok(Json(ScheduleLikeResponse {
        schedule_id: id,
        likes,
    }))
}
