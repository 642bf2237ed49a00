use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::services::auth::auth_middleware;
use crate::AppState;

pub fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/logout", post(controller::logout))
        .route("/panel", get(controller::panel))
        .route("/update", put(controller::update_profile))
        .route("/password/update", put(controller::password_update))
        .route("/delete", delete(controller::delete_account))
        .route("/comments", get(controller::own_comments))
        .route("/likes", get(controller::liked_recipes))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(controller::register))
        .route("/active", get(controller::activate))
        .route("/login", post(controller::login))
        .route("/password/reset", post(controller::password_reset))
        .route(
            "/password/set",
            get(controller::password_set_check).post(controller::password_set),
        )
        .merge(protected)
}
