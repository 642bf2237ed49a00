use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::services::auth::auth_middleware;
use crate::AppState;

pub fn ingredient_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/", post(controller::create))
        .route("/{id}", put(controller::update))
        .route("/{id}", delete(controller::remove))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(controller::list))
        .route("/{id}", get(controller::detail))
        .merge(protected)
}
