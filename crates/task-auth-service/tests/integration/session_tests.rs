//! E2E tests for login, logout and the guarded `/v1/me` route over HTTP.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use reqwest::{header::WWW_AUTHENTICATE, StatusCode};
use serde_json::{json, Value};
use task_auth_service::errors::WWW_AUTHENTICATE_CHALLENGE;
use task_auth_test_utils::*;

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_valid_credentials_returns_pair() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["expires_in_ml"].as_u64(), Some(TEST_ACCESS_TTL_MS));
    assert_eq!(
        body["refresh_expires_token_ml"].as_u64(),
        Some(TEST_REFRESH_TTL_MS)
    );

    let access = body["access_token"].as_str().unwrap().to_string();
    access
        .assert_valid_jwt()
        .assert_for_subject(TEST_USERNAME)
        .assert_has_role("ROLE_USER")
        .assert_lifetime_secs(60);

    let refresh = body["refresh_token"].as_str().unwrap().to_string();
    refresh
        .assert_valid_jwt()
        .assert_for_subject(TEST_USERNAME)
        .assert_has_no_roles()
        .assert_lifetime_secs(120);

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": "wrong" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[WWW_AUTHENTICATE].to_str()?,
        WWW_AUTHENTICATE_CHALLENGE
    );

    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert!(body.get("access_token").is_none());

    Ok(())
}

/// Unknown users get the same answer as a wrong password.
#[tokio::test]
async fn test_login_unknown_user_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "username": "mallory", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["message"], "Invalid username or password");

    Ok(())
}

#[tokio::test]
async fn test_login_blank_username_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "username": "   ", "password": TEST_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_login_missing_password_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

// ============================================================================
// Guarded route
// ============================================================================

#[tokio::test]
async fn test_me_with_access_token_returns_principal() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let pair = server.login(TEST_USERNAME, TEST_PASSWORD).await?;

    let response = server
        .client()
        .get(format!("{}/v1/me", server.url()))
        .bearer_auth(&pair.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["username"], TEST_USERNAME);
    assert_eq!(body["authorities"], json!(["ROLE_USER"]));

    Ok(())
}

#[tokio::test]
async fn test_me_without_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .get(format!("{}/v1/me", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    Ok(())
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_then_reuse_returns_revoked() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let pair = server.login(TEST_USERNAME, TEST_PASSWORD).await?;

    let response = server.logout(&pair.access_token).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .client()
        .get(format!("{}/v1/me", server.url()))
        .bearer_auth(&pair.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "TOKEN_REVOKED");

    Ok(())
}

#[tokio::test]
async fn test_logout_twice_returns_204() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let pair = server.login(TEST_USERNAME, TEST_PASSWORD).await?;

    assert_eq!(
        server.logout(&pair.access_token).await?.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        server.logout(&pair.access_token).await?.status(),
        StatusCode::NO_CONTENT
    );

    Ok(())
}

/// Logging out one session leaves a second, independent login usable.
#[tokio::test]
async fn test_logout_leaves_other_sessions_valid() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let first = server.login(TEST_USERNAME, TEST_PASSWORD).await?;
    let second = server.login(SECOND_USERNAME, SECOND_PASSWORD).await?;

    server.logout(&first.access_token).await?;

    let response = server
        .client()
        .get(format!("{}/v1/me", server.url()))
        .bearer_auth(&second.access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_logout_expired_token_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .expires_in(-30)
        .sign(&test_signing_key());

    let response = server.logout(&token).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "TOKEN_ALREADY_EXPIRED");

    Ok(())
}

#[tokio::test]
async fn test_logout_without_header_returns_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .post(format!("{}/auth/logout", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_logout_foreign_token_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&foreign_signing_key());

    let response = server.logout(&token).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    Ok(())
}
