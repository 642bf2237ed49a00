use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::services::auth::auth_middleware;
use crate::AppState;

pub fn recipe_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/wizard", post(controller::wizard_start))
        .route("/wizard/{draft_id}", get(controller::wizard_get))
        .route("/wizard/{draft_id}", delete(controller::wizard_cancel))
        .route("/wizard/{draft_id}/ingredients", put(controller::wizard_ingredients))
        .route("/wizard/{draft_id}/details", put(controller::wizard_details))
        .route("/wizard/{draft_id}/preparation", put(controller::wizard_preparation))
        .route("/wizard/{draft_id}/quantities", put(controller::wizard_quantities))
        .route("/wizard/{draft_id}/confirm", post(controller::wizard_confirm))
        .route("/{id}", delete(controller::remove))
        .route("/{id}/like", post(controller::like))
        .route("/{id}/unlike", post(controller::unlike))
        .route("/{id}/comments", post(controller::comment_add))
        .route("/{id}/comments/{comment_id}", delete(controller::comment_delete))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(controller::list))
        .route("/{id}", get(controller::detail))
        .merge(protected)
}
