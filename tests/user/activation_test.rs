use axum::http::StatusCode;

use crate::common::{test_email, test_username, TestContext};

async fn is_active(ctx: &TestContext, email: &str) -> bool {
    sqlx::query_scalar("SELECT is_active FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(&ctx.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn activation_with_valid_token_activates_and_consumes() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    assert!(!is_active(&ctx, &email).await);

    let token = ctx.account_token(&email).await;

    let response = ctx
        .server
        .get(&format!("/user/active?token={}", token))
        .await;
    response.assert_status(StatusCode::OK);

    assert!(is_active(&ctx, &email).await);

    // Single use: the token row is gone.
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_tokens WHERE token = ?")
        .bind(&token)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn activation_link_cannot_be_reused() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    let token = ctx.account_token(&email).await;

    ctx.server
        .get(&format!("/user/active?token={}", token))
        .await
        .assert_status(StatusCode::OK);

    // Visiting the same link again surfaces the generic link error and
    // changes nothing.
    let response = ctx
        .server
        .get(&format!("/user/active?token={}", token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("invalid"));

    assert!(is_active(&ctx, &email).await);
}

#[tokio::test]
async fn activation_with_unknown_token_changes_nothing() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;

    let response = ctx
        .server
        .get(&format!("/user/active?token={}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(!is_active(&ctx, &email).await);
}

#[tokio::test]
async fn activation_with_malformed_token_changes_nothing() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;

    // The canonical form is lowercase-hyphenated; anything else is turned
    // away without a lookup.
    let uppercase = ctx.account_token(&email).await.to_uppercase();

    for bad in ["", "not-a-token", "1234", uppercase.as_str()] {
        let response = ctx
            .server
            .get(&format!("/user/active?token={}", bad))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert!(!is_active(&ctx, &email).await);
}

#[tokio::test]
async fn activation_without_token_parameter_fails() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/user/active").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// Two racing redemptions of one token: at most one may win.
#[tokio::test]
async fn concurrent_redemption_succeeds_at_most_once() {
    let ctx = TestContext::new().await;
    let username = test_username();
    let email = test_email();

    ctx.register(&username, &email).await;
    let token = ctx.account_token(&email).await;
    let link = format!("/user/active?token={}", token);

    let (res1, res2) = tokio::join!(ctx.server.get(&link), ctx.server.get(&link));

    let successes = [res1.status_code(), res2.status_code()]
        .iter()
        .filter(|&&s| s == StatusCode::OK)
        .count();
    assert_eq!(successes, 1, "exactly one redemption may succeed");
}

// The registration scenario end to end: inactive account with one token,
// activation flips it, the link dies with its first use.
#[tokio::test]
async fn registration_activation_scenario() {
    let ctx = TestContext::new().await;

    ctx.register("ann", "ann@x.com").await;
    assert!(!is_active(&ctx, "ann@x.com").await);

    let tokens: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_tokens t JOIN users u ON u.id = t.user_id WHERE u.username = 'ann'",
    )
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(tokens, 1);

    let token = ctx.account_token("ann@x.com").await;
    let link = format!("/user/active?token={}", token);

    ctx.server.get(&link).await.assert_status(StatusCode::OK);
    assert!(is_active(&ctx, "ann@x.com").await);

    let response = ctx.server.get(&link).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(is_active(&ctx, "ann@x.com").await);
}
