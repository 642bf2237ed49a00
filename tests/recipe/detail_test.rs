use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

#[tokio::test]
async fn detail_is_open_to_anonymous_visitors() {
    let ctx = TestContext::new().await;
    let (username, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    let recipe = ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    let response = ctx.server.get(&format!("/recipes/{}", recipe)).await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Soup");
    assert_eq!(body["created_by"], username.as_str());
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(body["ingredients"][0]["name"], "Salt");
    assert_eq!(body["ingredients"][0]["quantity"], "5g");
    assert_eq!(body["likes"], 0);
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_recipe_is_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/recipes/424242")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_visitors_cannot_like_or_comment() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    let recipe = ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    ctx.server
        .post(&format!("/recipes/{}/like", recipe))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post(&format!("/recipes/{}/comments", recipe))
        .json(&json!({ "comment": "Nice" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// Likes are a set: liking twice leaves the count unchanged.
#[tokio::test]
async fn liking_twice_is_a_no_op() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    let recipe = ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    let response = ctx
        .server
        .post(&format!("/recipes/{}/like", recipe))
        .authorization_bearer(&access_token)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["likes"], 1);

    let response = ctx
        .server
        .post(&format!("/recipes/{}/like", recipe))
        .authorization_bearer(&access_token)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["likes"], 1);
}

#[tokio::test]
async fn unliking_an_absent_like_is_a_no_op() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    let recipe = ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    let response = ctx
        .server
        .post(&format!("/recipes/{}/unlike", recipe))
        .authorization_bearer(&access_token)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["likes"], 0);

    // Like then unlike round-trips to zero.
    ctx.server
        .post(&format!("/recipes/{}/like", recipe))
        .authorization_bearer(&access_token)
        .await
        .assert_status(StatusCode::OK);
    let response = ctx
        .server
        .post(&format!("/recipes/{}/unlike", recipe))
        .authorization_bearer(&access_token)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["likes"], 0);
}

#[tokio::test]
async fn comments_append_and_list_newest_first() {
    let ctx = TestContext::new().await;
    let (_, access_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&access_token, "Salt").await;
    let recipe = ctx.create_recipe(&access_token, "Soup", &[(salt, "5g")]).await;

    for comment in ["First!", "Second!"] {
        ctx.server
            .post(&format!("/recipes/{}/comments", recipe))
            .authorization_bearer(&access_token)
            .json(&json!({ "comment": comment }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = ctx.server.get(&format!("/recipes/{}", recipe)).await;
    let body: serde_json::Value = response.json();
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["comment"], "Second!");
    assert_eq!(comments[1]["comment"], "First!");
}

#[tokio::test]
async fn only_the_commenter_may_delete_their_comment() {
    let ctx = TestContext::new().await;
    let (_, author_token) = ctx.login_fresh_user().await;
    let (_, other_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&author_token, "Salt").await;
    let recipe = ctx.create_recipe(&author_token, "Soup", &[(salt, "5g")]).await;

    let response = ctx
        .server
        .post(&format!("/recipes/{}/comments", recipe))
        .authorization_bearer(&author_token)
        .json(&json!({ "comment": "Mine" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let comment_id = {
        let body: serde_json::Value = response.json();
        body["id"].as_i64().unwrap()
    };

    ctx.server
        .delete(&format!("/recipes/{}/comments/{}", recipe, comment_id))
        .authorization_bearer(&other_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.server
        .delete(&format!("/recipes/{}/comments/{}", recipe, comment_id))
        .authorization_bearer(&author_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_comments WHERE recipe_id = ?")
        .bind(recipe)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn deleting_a_recipe_is_creator_only_and_cascades() {
    let ctx = TestContext::new().await;
    let (_, creator_token) = ctx.login_fresh_user().await;
    let (_, other_token) = ctx.login_fresh_user().await;

    let salt = ctx.create_ingredient(&creator_token, "Salt").await;
    let recipe = ctx.create_recipe(&creator_token, "Soup", &[(salt, "5g")]).await;

    ctx.server
        .delete(&format!("/recipes/{}", recipe))
        .authorization_bearer(&other_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.server
        .delete(&format!("/recipes/{}", recipe))
        .authorization_bearer(&creator_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    ctx.server
        .get(&format!("/recipes/{}", recipe))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The join rows went with it; the ingredient itself survives.
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(rows, 0);

    let ingredients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE id = ?")
        .bind(salt)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(ingredients, 1);
}
