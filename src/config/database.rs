use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

pub type DbPool = Pool<Sqlite>;

pub async fn init_db(database_url: &str) -> DbPool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("DATABASE_URL is not a valid SQLite URL")
        .create_if_missing(true)
        // The schema relies on ON DELETE SET NULL / CASCADE / RESTRICT rules.
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .expect("Failed to connect to SQLite")
}
