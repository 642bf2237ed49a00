use foodbook::config::{environment::Config, init_db};
use foodbook::services::{jwt::JwtService, mailer::Mailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    let db = init_db(&config.database_url).await;
    tracing::info!("Connected to SQLite");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");

    let jwt_service = JwtService::new(config.jwt_secret);
    let mailer = Mailer::new(config.public_host);

    let app = foodbook::create_app(db, jwt_service, mailer).await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await.unwrap();
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.unwrap();
}
