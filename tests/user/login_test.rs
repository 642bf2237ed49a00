use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_email, test_password, test_username, TestContext};

#[tokio::test]
async fn login_before_activation_is_rejected() {
    let ctx = TestContext::new().await;
    let username = test_username();

    ctx.register(&username, &test_email()).await;

    let response = ctx
        .server
        .post("/user/login")
        .json(&json!({
            "username": &username,
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("not active"));
}

#[tokio::test]
async fn login_after_activation_returns_token() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    ctx.activate(&email).await;

    let response = ctx
        .server
        .post("/user/login")
        .json(&json!({
            "username": &username,
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body.get("access_token").is_some());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn login_with_unknown_username_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/user/login")
        .json(&json!({
            "username": "nobody-here",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    ctx.activate(&email).await;

    let response = ctx
        .server
        .post("/user/login")
        .json(&json!({
            "username": &username,
            "password": "WrongPassword123!"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_grants_access_to_protected_routes() {
    let ctx = TestContext::new().await;
    let (username, access_token) = ctx.login_fresh_user().await;

    let response = ctx
        .server
        .get("/user/panel")
        .authorization_bearer(&access_token)
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], username.as_str());
}

#[tokio::test]
async fn protected_routes_require_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/user/panel").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = ctx
        .server
        .get("/user/panel")
        .authorization_bearer("garbage-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    ctx.server
        .post("/user/logout")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);

    let response = ctx
        .server
        .get("/user/panel")
        .authorization_bearer(&access_token)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
