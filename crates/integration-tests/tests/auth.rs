//! Registration and login against a running server with a migrated database.

#![allow(clippy::unwrap_used)]

use booksearch_integration_tests::{AuthBody, ErrorBody, TestContext, unique_email};
use reqwest::StatusCode;
use serde_json::json;

async fn post(ctx: &TestContext, path: &str, email: &str, password: &str) -> reqwest::Response {
    ctx.client
        .post(ctx.url(path))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running booksearch-server"]
async fn test_register_then_login() {
    let ctx = TestContext::new();
    let email = unique_email();

    let resp = post(&ctx, "/api/auth/register", &email, "correct horse").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: AuthBody = resp.json().await.unwrap();
    assert_eq!(registered.email, email);
    assert!(!registered.token.is_empty());

    let resp = post(&ctx, "/api/auth/login", &email.to_uppercase(), "correct horse").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let logged_in: AuthBody = resp.json().await.unwrap();
    assert_eq!(logged_in.email, email);
    assert_ne!(logged_in.token, registered.token);
}

#[tokio::test]
#[ignore = "Requires running booksearch-server"]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    let email = unique_email();

    let first = post(&ctx, "/api/auth/register", &email, "correct horse").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post(&ctx, "/api/auth/register", &email, "another horse").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running booksearch-server"]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let ctx = TestContext::new();
    let email = unique_email();
    post(&ctx, "/api/auth/register", &email, "correct horse").await;

    let wrong_password = post(&ctx, "/api/auth/login", &email, "wrong horse").await;
    let unknown_email = post(&ctx, "/api/auth/login", &unique_email(), "correct horse").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a: ErrorBody = wrong_password.json().await.unwrap();
    let b: ErrorBody = unknown_email.json().await.unwrap();
    assert_eq!(a.error, b.error);
}
