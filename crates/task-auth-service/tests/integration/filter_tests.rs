//! Request filter outcomes, driven through the real router with `oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use std::sync::Arc;
use task_auth_service::directory::{
    mock::UnavailableDirectory, DirectoryUser, InMemoryUserDirectory, UserDirectory,
};
use task_auth_service::errors::AuthError;
use task_auth_service::revocation::RevocationStore;
use task_auth_service::routes::{build_routes, AppState};
use task_auth_test_utils::*;
use tower::ServiceExt;

fn router_with(directory: Arc<dyn UserDirectory>) -> Router {
    let state = Arc::new(AppState::new(test_config(), directory).unwrap());
    build_routes(state, PrometheusBuilder::new().build_recorder().handle())
}

fn me_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/v1/me");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, challenge, body)
}

/// Looks users up case-insensitively but reports the stored spelling.
struct CaseInsensitiveDirectory(InMemoryUserDirectory);

#[async_trait]
impl UserDirectory for CaseInsensitiveDirectory {
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, AuthError> {
        self.0
            .find_principal_by_username(&username.to_lowercase())
            .await
    }
}

#[tokio::test]
async fn test_valid_token_installs_principal() {
    let app = router_with(seeded_directory().await);
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&test_signing_key());

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], TEST_USERNAME);
}

#[tokio::test]
async fn test_expired_token_returns_401_with_challenge() {
    let app = router_with(seeded_directory().await);
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .expires_in(-1)
        .sign(&test_signing_key());

    let (status, challenge, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.unwrap().contains("invalid_token"));
    assert_eq!(body["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_foreign_signature_returns_400() {
    let app = router_with(seeded_directory().await);
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&foreign_signing_key());

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

/// Flipping one payload byte breaks the signature.
#[tokio::test]
async fn test_tampered_payload_returns_400() {
    let app = router_with(seeded_directory().await);
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&test_signing_key());

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let mut payload = parts[1].clone().into_bytes();
    payload[2] = if payload[2] == b'A' { b'B' } else { b'A' };
    parts[1] = String::from_utf8(payload).unwrap();
    let tampered = parts.join(".");

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {tampered}")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_malformed_token_returns_400() {
    let app = router_with(seeded_directory().await);

    let (status, _, body) = send(app, me_request(Some("Bearer not-a-jwt"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

/// A non-bearer scheme leaves the request anonymous; the guard then says 401.
#[tokio::test]
async fn test_basic_scheme_is_anonymous() {
    let app = router_with(seeded_directory().await);

    let (status, _, body) = send(app, me_request(Some("Basic YWxpY2U6cHc="))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_deleted_user_returns_principal_not_found() {
    let directory = seeded_directory().await;
    let app = router_with(directory.clone());
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&test_signing_key());

    assert!(directory.remove(TEST_USERNAME).await);

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PRINCIPAL_NOT_FOUND");
}

#[tokio::test]
async fn test_subject_mismatch_returns_401() {
    let inner = InMemoryUserDirectory::new();
    inner
        .insert(DirectoryUser::new(TEST_USERNAME, "$2b$04$unused"))
        .await;
    let app = router_with(Arc::new(CaseInsensitiveDirectory(inner)));
    let token = TestTokenBuilder::new()
        .for_user("ALICE")
        .sign(&test_signing_key());

    let (status, challenge, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.is_some());
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_directory_outage_returns_503() {
    let app = router_with(Arc::new(UnavailableDirectory::new()));
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&test_signing_key());

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

/// Revocation through the shared store is seen by the filter at once.
#[tokio::test]
async fn test_revoked_token_returns_400() {
    let state = Arc::new(AppState::new(test_config(), seeded_directory().await).unwrap());
    let app = build_routes(state.clone(), PrometheusBuilder::new().build_recorder().handle());
    let token = TestTokenBuilder::new()
        .for_user(TEST_USERNAME)
        .sign(&test_signing_key());
    let claims = task_auth_service::token::codec::verify(&token, &test_signing_key()).unwrap();

    state
        .revocations
        .revoke(&token, claims.exp, chrono::Utc::now().timestamp())
        .unwrap();

    let (status, _, body) = send(app, me_request(Some(&format!("Bearer {token}")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_custom_public_prefix_skips_filter() {
    let mut vars = test_config_vars();
    vars.insert("AUTH_PUBLIC_PATHS".to_string(), "/v1/**,/auth/login".to_string());
    let config = task_auth_service::config::Config::from_vars(&vars).unwrap();
    let state = Arc::new(AppState::new(config, seeded_directory().await).unwrap());
    let app = build_routes(state, PrometheusBuilder::new().build_recorder().handle());

    // Filter skipped: no principal, so the route guard answers instead of
    // the token error.
    let (status, _, body) = send(app, me_request(Some("Bearer not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}
