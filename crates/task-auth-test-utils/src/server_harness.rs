//! Test server harness for E2E testing
//!
//! Provides TestAuthServer for spawning real service instances in tests.

use crate::fixtures::test_config;
use anyhow::{anyhow, Context};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use task_auth_service::config::Config;
use task_auth_service::directory::UserDirectory;
use task_auth_service::observability::metrics::init_metrics_recorder;
use task_auth_service::routes::{self, AppState};
use task_auth_service::token::TokenPair;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn(seeded_directory().await).await?;
///     let response = server
///         .client()
///         .post(format!("{}/auth/login", server.url()))
///         .json(&json!({"username": "alice", "password": "..."}))
///         .send()
///         .await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn with [`test_config`] on a random local port.
    pub async fn spawn(directory: Arc<dyn UserDirectory>) -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config(), directory).await
    }

    /// Spawn with a custom configuration. `bind_address` is ignored.
    pub async fn spawn_with_config(
        config: Config,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(
            AppState::new(config, directory).map_err(|e| anyhow!("Invalid test config: {}", e))?,
        );

        // Only the first server in a test process can install the global
        // recorder; later ones render from a detached recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test server")?;
        let addr = listener
            .local_addr()
            .context("Failed to get local address")?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared state, for reaching the revocation store or issuer directly.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST /auth/login and decode the pair. Fails on any non-200 status.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.url()))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("login failed with status {}", status));
        }

        Ok(response.json().await?)
    }

    /// POST /auth/logout with `token` as bearer. Returns the raw response.
    pub async fn logout(&self, token: &str) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}/auth/logout", self.url()))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
