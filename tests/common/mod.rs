use axum_test::TestServer;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use foodbook::config::DbPool;
use foodbook::services::{jwt::JwtService, mailer::Mailer};

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: DbPool,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);

        // A single connection keeps every query on the same in-memory
        // database.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let jwt_service = JwtService::new("test-secret-key-for-testing-only".to_string());
        let mailer = Mailer::new("http://testserver".to_string());

        let app = foodbook::create_app(db.clone(), jwt_service, mailer).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, db }
    }

    /// Register an account (inactive, token issued).
    pub async fn register(&self, username: &str, email: &str) {
        let response = self
            .server
            .post("/user/register")
            .json(&json!({
                "username": username,
                "email": email,
                "first_name": "Test",
                "last_name": "User",
                "password": test_password(),
                "password_repeat": test_password()
            }))
            .await;
        assert_eq!(response.status_code(), 201, "registration failed: {}", response.text());
    }

    /// The live single-use token bound to the given account.
    pub async fn account_token(&self, email: &str) -> String {
        sqlx::query_scalar(
            "SELECT t.token FROM user_tokens t JOIN users u ON u.id = t.user_id WHERE u.email = ?",
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .expect("no token for user")
    }

    pub async fn activate(&self, email: &str) {
        let token = self.account_token(email).await;
        let response = self
            .server
            .get(&format!("/user/active?token={}", token))
            .await;
        assert_eq!(response.status_code(), 200, "activation failed: {}", response.text());
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .server
            .post("/user/login")
            .json(&json!({
                "username": username,
                "password": test_password()
            }))
            .await;
        assert_eq!(response.status_code(), 200, "login failed: {}", response.text());

        let body: serde_json::Value = response.json();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register, activate and log in a fresh account; returns (username, token).
    pub async fn login_fresh_user(&self) -> (String, String) {
        let username = test_username();
        let email = test_email();
        self.register(&username, &email).await;
        self.activate(&email).await;
        let access_token = self.login(&username).await;
        (username, access_token)
    }

    pub async fn create_ingredient(&self, access_token: &str, name: &str) -> i64 {
        let response = self
            .server
            .post("/ingredients")
            .authorization_bearer(access_token)
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), 201, "ingredient create failed: {}", response.text());

        let body: serde_json::Value = response.json();
        body["id"].as_i64().unwrap()
    }

    /// Drive the whole four-step wizard and confirm; returns the recipe id.
    pub async fn create_recipe(
        &self,
        access_token: &str,
        name: &str,
        rows: &[(i64, &str)],
    ) -> i64 {
        let response = self
            .server
            .post("/recipes/wizard")
            .authorization_bearer(access_token)
            .json(&json!({}))
            .await;
        assert_eq!(response.status_code(), 201, "wizard start failed: {}", response.text());
        let draft_id = {
            let body: serde_json::Value = response.json();
            body["draft_id"].as_str().unwrap().to_string()
        };

        let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
        let response = self
            .server
            .put(&format!("/recipes/wizard/{}/ingredients", draft_id))
            .authorization_bearer(access_token)
            .json(&json!({ "ingredient_ids": ids }))
            .await;
        assert_eq!(response.status_code(), 200, "step 1 failed: {}", response.text());

        let response = self
            .server
            .put(&format!("/recipes/wizard/{}/details", draft_id))
            .authorization_bearer(access_token)
            .json(&json!({ "name": name, "preparation_time": 30 }))
            .await;
        assert_eq!(response.status_code(), 200, "step 2 failed: {}", response.text());

        let response = self
            .server
            .put(&format!("/recipes/wizard/{}/preparation", draft_id))
            .authorization_bearer(access_token)
            .json(&json!({ "preparing": "Combine everything and cook." }))
            .await;
        assert_eq!(response.status_code(), 200, "step 3 failed: {}", response.text());

        let quantity_rows: Vec<serde_json::Value> = rows
            .iter()
            .map(|(id, quantity)| json!({ "ingredient_id": id, "quantity": quantity }))
            .collect();
        let response = self
            .server
            .put(&format!("/recipes/wizard/{}/quantities", draft_id))
            .authorization_bearer(access_token)
            .json(&json!({ "rows": quantity_rows }))
            .await;
        assert_eq!(response.status_code(), 200, "step 4 failed: {}", response.text());

        let response = self
            .server
            .post(&format!("/recipes/wizard/{}/confirm", draft_id))
            .authorization_bearer(access_token)
            .await;
        assert_eq!(response.status_code(), 200, "confirm failed: {}", response.text());

        let body: serde_json::Value = response.json();
        body["recipe_id"].as_i64().unwrap()
    }
}

// Helper to generate unique test usernames
#[allow(dead_code)]
pub fn test_username() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

// Helper to generate unique test emails
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4().simple())
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
