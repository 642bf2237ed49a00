use axum::http::StatusCode;
use serde_json::json;

use crate::common::{test_email, test_password, test_username, TestContext};

// =============================================================================
// PASSWORD UPDATE (logged in)
// =============================================================================

#[tokio::test]
async fn password_update_changes_password_and_ends_the_session() {
    let ctx = TestContext::new().await;
    let (username, access_token) = ctx.login_fresh_user().await;

    let response = ctx
        .server
        .put("/user/password/update")
        .authorization_bearer(&access_token)
        .json(&json!({
            "password": test_password(),
            "password_new": "BrandNewPass1!",
            "password_repeat": "BrandNewPass1!"
        }))
        .await;
    response.assert_status(StatusCode::OK);

    // The old session is over.
    ctx.server
        .get("/user/panel")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // The old password no longer works, the new one does.
    ctx.server
        .post("/user/login")
        .json(&json!({ "username": &username, "password": test_password() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/user/login")
        .json(&json!({ "username": &username, "password": "BrandNewPass1!" }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn password_update_requires_the_current_password() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let response = ctx
        .server
        .put("/user/password/update")
        .authorization_bearer(&access_token)
        .json(&json!({
            "password": "NotMyPassword1!",
            "password_new": "BrandNewPass1!",
            "password_repeat": "BrandNewPass1!"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    // The session survives a failed attempt.
    ctx.server
        .get("/user/panel")
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);
}

// =============================================================================
// PASSWORD RESET (token flow)
// =============================================================================

#[tokio::test]
async fn reset_for_active_user_issues_a_password_set_token() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    ctx.activate(&email).await;

    let response = ctx
        .server
        .post("/user/password/reset")
        .json(&json!({ "email": &email }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("reset"));

    // The emailed link checks out.
    let token = ctx.account_token(&email).await;
    ctx.server
        .get(&format!("/user/password/set?token={}", token))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn reset_for_inactive_user_resends_the_activation_link() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    let original_token = ctx.account_token(&email).await;

    let response = ctx
        .server
        .post("/user/password/reset")
        .json(&json!({ "email": &email }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("activation"));

    // Get-or-create: the live token is reused, not replaced.
    assert_eq!(ctx.account_token(&email).await, original_token);
}

#[tokio::test]
async fn reset_with_unknown_email_is_a_field_error() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/user/password/reset")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// PASSWORD SET (token redemption)
// =============================================================================

#[tokio::test]
async fn password_set_redeems_the_token_and_stores_the_password() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    ctx.activate(&email).await;

    ctx.server
        .post("/user/password/reset")
        .json(&json!({ "email": &email }))
        .await
        .assert_status(StatusCode::OK);

    let token = ctx.account_token(&email).await;

    let response = ctx
        .server
        .post(&format!("/user/password/set?token={}", token))
        .json(&json!({
            "password_new": "FreshSecret1!",
            "password_repeat": "FreshSecret1!"
        }))
        .await;
    response.assert_status(StatusCode::OK);

    // No automatic login; the new credential works at the login endpoint.
    ctx.server
        .post("/user/login")
        .json(&json!({ "username": &username, "password": "FreshSecret1!" }))
        .await
        .assert_status(StatusCode::OK);

    // Single use: the same link is dead now.
    ctx.server
        .get(&format!("/user/password/set?token={}", token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post(&format!("/user/password/set?token={}", token))
        .json(&json!({
            "password_new": "AnotherPass1!",
            "password_repeat": "AnotherPass1!"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_set_rejects_mismatched_or_weak_passwords() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    ctx.activate(&email).await;
    ctx.server
        .post("/user/password/reset")
        .json(&json!({ "email": &email }))
        .await
        .assert_status(StatusCode::OK);

    let token = ctx.account_token(&email).await;

    let response = ctx
        .server
        .post(&format!("/user/password/set?token={}", token))
        .json(&json!({
            "password_new": "FreshSecret1!",
            "password_repeat": "SomethingElse1!"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .server
        .post(&format!("/user/password/set?token={}", token))
        .json(&json!({
            "password_new": "weak",
            "password_repeat": "weak"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // A failed attempt must not consume the token.
    ctx.server
        .get(&format!("/user/password/set?token={}", token))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn password_set_check_rejects_bad_links() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/user/password/set?token=not-a-token")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .server
        .get(&format!("/user/password/set?token={}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
