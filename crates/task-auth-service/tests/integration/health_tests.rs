//! Operational endpoints: `/health` and `/metrics` stay public.

use reqwest::StatusCode;
use task_auth_test_utils::{seeded_directory, TestAuthServer};

#[tokio::test]
async fn test_health_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

/// A bogus token on a public path is never looked at.
#[tokio::test]
async fn test_health_ignores_invalid_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .bearer_auth("definitely.not.valid")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn(seeded_directory().await).await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
