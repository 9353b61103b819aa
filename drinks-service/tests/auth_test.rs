mod common;

use axum::http::{Method, StatusCode};
use common::{base_claims, json_body, sign, token_with, water, TestApp, BARISTA, MANAGER};
use serde_json::json;

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/drinks", None, Some(json_body(&water())))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 401);
    assert_eq!(body["message"], "Authorization header is expected.");
    assert_eq!(app.drink_count().await, 0);
}

#[tokio::test]
async fn detail_listing_needs_a_token() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/drinks-detail", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], 401);
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let app = TestApp::new();
    let token = token_with(BARISTA);

    let (status, body) = app
        .send(Method::POST, "/drinks", Some(&token), Some(json_body(&water())))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], 403);
    assert_eq!(app.drink_count().await, 0);

    let (status, _) = app
        .send(Method::DELETE, "/drinks/1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn barista_can_read_details() {
    let app = TestApp::new();
    app.create(water()).await;
    let token = token_with(BARISTA);

    let (status, body) = app
        .send(Method::GET, "/drinks-detail", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");
}

#[tokio::test]
async fn permissions_claim_absent_is_bad_request() {
    let app = TestApp::new();
    let token = sign(&base_claims());

    let (status, body) = app
        .send(Method::GET, "/drinks-detail", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], 400);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = TestApp::new();
    let mut claims = base_claims();
    claims["exp"] = json!(chrono::Utc::now().timestamp() - 3600);
    claims["permissions"] = json!(MANAGER);
    let token = sign(&claims);

    let (status, body) = app
        .send(Method::POST, "/drinks", Some(&token), Some(json_body(&water())))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired.");
}

#[tokio::test]
async fn wrong_audience_is_unauthorized() {
    let app = TestApp::new();
    let mut claims = base_claims();
    claims["aud"] = json!("someone-else");
    claims["permissions"] = json!(MANAGER);
    let token = sign(&claims);

    let (status, _) = app
        .send(Method::GET, "/drinks-detail", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/drinks-detail", Some("not-a-jwt"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], 400);
}

#[tokio::test]
async fn public_listing_ignores_authorization() {
    let app = TestApp::new();
    let (status, _) = app
        .send(Method::GET, "/drinks", Some("not-a-jwt"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unserved_method_is_rejected_before_auth() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/drinks/1", None, None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], 405);
}
