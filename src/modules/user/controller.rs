use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use super::crud::{NewUser, UserCrud, UserError};
use super::model::AccountState;
use super::schema::{
    LikedRecipeResponse, LoginRequest, LoginResponse, MessageResponse, OwnCommentResponse,
    PanelResponse, PasswordResetRequest, PasswordSetRequest, PasswordUpdateRequest,
    RegisterRequest, RegisterResponse, TokenQuery, UserResponse, UserUpdateRequest,
};
use crate::services::auth::{revoke_token, AuthSession};
use crate::services::metrics::METRICS;
use crate::services::pagination::{ListQuery, Page};
use crate::services::{hashing, images, password, token};
use crate::AppState;

// =============================================================================
// POST /user/register
// =============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), UserError> {
    req.validate()?;

    if req.password != req.password_repeat {
        return Err(UserError::Invalid("Passwords do not match".to_string()));
    }

    password::validate_strength(&req.password).map_err(UserError::Invalid)?;

    let crud = UserCrud::new(state.db.clone());

    if crud.username_taken(&req.username, None).await? {
        return Err(UserError::UsernameTaken);
    }
    if crud.email_taken(&req.email, None).await? {
        return Err(UserError::EmailTaken);
    }

    let password_hash =
        hashing::hash_password(&req.password).map_err(|e| UserError::Internal(e.to_string()))?;

    let new = NewUser {
        username: req.username.clone(),
        email: req.email.clone(),
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        password_hash,
        avatar: req
            .avatar
            .as_deref()
            .map(|name| images::upload_path("user", name)),
    };

    let user_id = crud.create(&new).await?;

    let activation_token = token::issue(&state.db, user_id).await?;
    state
        .mailer
        .send_activation(&req.email, &req.username, &activation_token);

    METRICS.users_registered.inc();
    tracing::info!(username = %req.username, "registered new account");

    let user = crud.find_by_id(user_id).await?.ok_or(UserError::NotFound)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user: user.into() }),
    ))
}

// =============================================================================
// GET /user/active?token=
// =============================================================================

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MessageResponse>, UserError> {
    let raw = query.token.as_deref().unwrap_or_default();

    let crud = UserCrud::new(state.db.clone());

    if !crud.activate_with_token(raw).await? {
        return Err(UserError::BadLink);
    }

    METRICS.users_activated.inc();

    Ok(Json(MessageResponse {
        message: "Your account is now active. You can log in.",
    }))
}

// =============================================================================
// POST /user/login
// =============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, UserError> {
    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_username(&req.username)
        .await?
        .ok_or(UserError::UnknownUsername)?;

    let is_valid = hashing::verify_password(&req.password, &user.password_hash)
        .map_err(|e| UserError::Internal(e.to_string()))?;

    if !is_valid {
        return Err(UserError::WrongPassword);
    }

    if !user.is_active {
        return Err(UserError::AccountInactive);
    }

    crud.update_last_login(user.id).await?;

    let access_token = state
        .jwt_service
        .create_access_token(user.id, &user.username)
        .map_err(|e| UserError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.get_access_token_duration_secs(),
    }))
}

// =============================================================================
// POST /user/logout
// =============================================================================

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<MessageResponse>, UserError> {
    revoke_token(&state, &session.token, session.token_exp).await?;

    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

// =============================================================================
// GET /user/panel
// =============================================================================

pub async fn panel(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<PanelResponse>, UserError> {
    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_id(session.user_id)
        .await?
        .ok_or(UserError::NotFound)?;
    let (recipes, schedules, comments, likes) = crud.panel_counts(session.user_id).await?;

    Ok(Json(PanelResponse {
        user: user.into(),
        recipes,
        schedules,
        comments,
        likes,
    }))
}

// =============================================================================
// PUT /user/update
// =============================================================================

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<UserUpdateRequest>,
) -> Result<Json<UserResponse>, UserError> {
    req.validate()?;

    let crud = UserCrud::new(state.db.clone());

    if crud.username_taken(&req.username, Some(session.user_id)).await? {
        return Err(UserError::UsernameTaken);
    }
    if crud.email_taken(&req.email, Some(session.user_id)).await? {
        return Err(UserError::EmailTaken);
    }

    let avatar = req
        .avatar
        .as_deref()
        .map(|name| images::upload_path("user", name));

    crud.update_profile(
        session.user_id,
        &req.username,
        &req.email,
        &req.first_name,
        &req.last_name,
        avatar.as_deref(),
    )
    .await?;

    let user = crud
        .find_by_id(session.user_id)
        .await?
        .ok_or(UserError::NotFound)?;

    Ok(Json(user.into()))
}

// =============================================================================
// PUT /user/password/update
// =============================================================================

pub async fn password_update(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<PasswordUpdateRequest>,
) -> Result<Json<MessageResponse>, UserError> {
    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_id(session.user_id)
        .await?
        .ok_or(UserError::NotFound)?;

    let is_valid = hashing::verify_password(&req.password, &user.password_hash)
        .map_err(|e| UserError::Internal(e.to_string()))?;

    if !is_valid {
        return Err(UserError::WrongPassword);
    }

    if req.password_new != req.password_repeat {
        return Err(UserError::Invalid("Passwords do not match".to_string()));
    }

    password::validate_strength(&req.password_new).map_err(UserError::Invalid)?;

    let password_hash = hashing::hash_password(&req.password_new)
        .map_err(|e| UserError::Internal(e.to_string()))?;

    crud.update_password(session.user_id, &password_hash).await?;

    // The change ends the current session; the caller logs in again.
    revoke_token(&state, &session.token, session.token_exp).await?;

    Ok(Json(MessageResponse {
        message: "Password changed. Log in again with the new password.",
    }))
}

// =============================================================================
// POST /user/password/reset
// =============================================================================

pub async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, UserError> {
    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_email(&req.email)
        .await?
        .ok_or(UserError::UnknownEmail)?;

    let account = crud.account_state(user.id).await?;
    let reset_token = match account.token() {
        Some(existing) => existing.to_string(),
        None => token::issue(&state.db, user.id).await?,
    };

    // A reset means nothing before activation; re-send the activation link
    // in that case.
    match account {
        AccountState::Active { .. } => {
            state
                .mailer
                .send_password_set(&user.email, &user.username, &reset_token);
            Ok(Json(MessageResponse {
                message: "Check your mailbox and follow the password reset link",
            }))
        }
        AccountState::Inactive { .. } => {
            state
                .mailer
                .send_activation(&user.email, &user.username, &reset_token);
            Ok(Json(MessageResponse {
                message: "Your account is not active yet. Check your mailbox for the activation link",
            }))
        }
    }
}

// =============================================================================
// GET /user/password/set?token=
// =============================================================================

pub async fn password_set_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MessageResponse>, UserError> {
    let raw = query.token.as_deref().unwrap_or_default();

    if !token::validate(&state.db, raw).await? {
        return Err(UserError::BadLink);
    }

    Ok(Json(MessageResponse {
        message: "Set a new password",
    }))
}

// =============================================================================
// POST /user/password/set?token=
// =============================================================================

pub async fn password_set(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<PasswordSetRequest>,
) -> Result<Json<MessageResponse>, UserError> {
    if req.password_new != req.password_repeat {
        return Err(UserError::Invalid("Passwords do not match".to_string()));
    }

    password::validate_strength(&req.password_new).map_err(UserError::Invalid)?;

    let raw = query.token.as_deref().unwrap_or_default();
    let password_hash = hashing::hash_password(&req.password_new)
        .map_err(|e| UserError::Internal(e.to_string()))?;

    let crud = UserCrud::new(state.db.clone());

    if !crud.set_password_with_token(raw, &password_hash).await? {
        return Err(UserError::BadLink);
    }

    Ok(Json(MessageResponse {
        message: "Your password has been set. You can log in.",
    }))
}

// =============================================================================
// DELETE /user/delete
// =============================================================================

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<MessageResponse>, UserError> {
    revoke_token(&state, &session.token, session.token_exp).await?;

    let crud = UserCrud::new(state.db.clone());
    crud.delete(session.user_id).await?;

    tracing::info!(username = %session.username, "account deleted");

    Ok(Json(MessageResponse {
        message: "Your account has been deleted",
    }))
}

// =============================================================================
// GET /user/comments - the caller's deletable comment list
// =============================================================================

pub async fn own_comments(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<OwnCommentResponse>>, UserError> {
    let crud = UserCrud::new(state.db.clone());
    let (items, total) = crud.own_comments(session.user_id, &query).await?;

    Ok(Json(Page::new(
        items.into_iter().map(Into::into).collect(),
        query.page(),
        total,
        query.name_filter().is_some(),
    )))
}

// =============================================================================
// GET /user/likes - recipes the caller liked
// =============================================================================

pub async fn liked_recipes(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<LikedRecipeResponse>>, UserError> {
    let crud = UserCrud::new(state.db.clone());
    let (items, total) = crud.liked_recipes(session.user_id, &query).await?;

    Ok(Json(Page::new(
        items.into_iter().map(Into::into).collect(),
        query.page(),
        total,
        query.name_filter().is_some(),
    )))
}
