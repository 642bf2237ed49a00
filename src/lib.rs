#![feature(int_roundings)]

pub mod config;
pub mod modules;
pub mod services;

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::DbPool;
use modules::ingredient::ingredient_routes;
use modules::metrics::metrics_routes;
use modules::recipe::recipe_routes;
use modules::recipe::wizard::WizardStore;
use modules::schedule::schedule_routes;
use modules::user::user_routes;
use services::jwt::JwtService;
use services::mailer::Mailer;
use services::metrics::METRICS;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub mailer: Mailer,
    pub wizard: WizardStore,
}

pub async fn create_app(db: DbPool, jwt_service: JwtService, mailer: Mailer) -> Router {
    let state = Arc::new(AppState {
        db,
        jwt_service,
        mailer,
        wizard: WizardStore::new(),
    });

    // Rate limit: generous burst, then 1 per minute
    let rate_limiter = create_rate_limiter(100);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(metrics_routes())
        .nest("/user", user_routes(state.clone()))
        .nest("/ingredients", ingredient_routes(state.clone()))
        .nest("/recipes", recipe_routes(state.clone()))
        .nest("/schedules", schedule_routes(state.clone()))
        .layer(middleware::from_fn(track_requests))
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    METRICS.http_requests.inc();
    next.run(request).await
}

async fn root() -> &'static str {
    "Foodbook API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
