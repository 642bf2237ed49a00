use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

#[tokio::test]
async fn create_requires_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/ingredients")
        .json(&json!({ "name": "Salt" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_created_with_creator() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let response = ctx
        .server
        .post("/ingredients")
        .authorization_bearer(&access_token)
        .json(&json!({ "name": "Salt" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Salt");
    assert!(body["create_by"].is_i64());
}

#[tokio::test]
async fn duplicate_name_is_a_conflict() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    ctx.create_ingredient(&access_token, "Salt").await;

    let response = ctx
        .server
        .post("/ingredients")
        .authorization_bearer(&access_token)
        .json(&json!({ "name": "Salt" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn update_is_creator_only() {
    let ctx = TestContext::new().await;
    let (_, creator_token) = ctx.login_fresh_user().await;
    let (_, other_token) = ctx.login_fresh_user().await;

    let id = ctx.create_ingredient(&creator_token, "Salt").await;

    // Another actor is turned away with nothing changed.
    let response = ctx
        .server
        .put(&format!("/ingredients/{}", id))
        .authorization_bearer(&other_token)
        .json(&json!({ "name": "Sugar" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let name: String = sqlx::query_scalar("SELECT name FROM ingredients WHERE id = ?")
        .bind(id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(name, "Salt");

    // The creator may rename.
    let response = ctx
        .server
        .put(&format!("/ingredients/{}", id))
        .authorization_bearer(&creator_token)
        .json(&json!({ "name": "Sea Salt" }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Sea Salt");
}

#[tokio::test]
async fn delete_of_unreferenced_ingredient_succeeds() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let id = ctx.create_ingredient(&access_token, "Salt").await;

    let response = ctx
        .server
        .delete(&format!("/ingredients/{}", id))
        .authorization_bearer(&access_token)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    ctx.server
        .get(&format!("/ingredients/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_referenced_ingredient_is_refused_with_a_reason() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    let response = ctx
        .server
        .delete(&format!("/ingredients/{}", salt))
        .authorization_bearer(&access_token)
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("cannot be deleted"));

    // Nothing was removed.
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE id = ?")
        .bind(salt)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn delete_is_creator_only() {
    let ctx = TestContext::new().await;
    let (_, creator_token) = ctx.login_fresh_user().await;
    let (_, other_token) = ctx.login_fresh_user().await;

    let id = ctx.create_ingredient(&creator_token, "Salt").await;

    let response = ctx
        .server
        .delete(&format!("/ingredients/{}", id))
        .authorization_bearer(&other_token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE id = ?")
        .bind(id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn missing_ingredient_is_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/ingredients/424242")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
