//! Test server harness for E2E testing
//!
//! Provides TestTokenServer for spawning real token service instances backed
//! by a seeded in-memory store.

use crate::fault_injection::FaultyRepository;
use crate::fixtures::{seed_fixtures, Fixtures};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use token_service::config::Config;
use token_service::repositories::InMemoryTokenRepository;
use token_service::routes::{self, AppState};
use tokio::task::JoinHandle;

/// Test harness for spawning the token service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_tokens_e2e() -> Result<()> {
///     let server = TestTokenServer::spawn().await?;
///
///     let response = reqwest::Client::new()
///         .get(server.workspace_url(TEST_WORKSPACE_A, "/tokens"))
///         .bearer_auth(TEST_PRIMARY_KEY_A)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    store: InMemoryTokenRepository,
    faults: FaultyRepository,
    fixtures: Fixtures,
    handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a new server with freshly seeded fixtures.
    ///
    /// The server binds to 127.0.0.1:0. Requests pass through a
    /// [`FaultyRepository`] with no faults enabled.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let store = InMemoryTokenRepository::new();
        let fixtures = seed_fixtures(&store).await;
        let faults = FaultyRepository::new(Arc::new(store.clone()));

        let vars = HashMap::from([("TOKEN_STORE".to_string(), "memory".to_string())]);
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to build test config: {}", e))?;

        let state = Arc::new(AppState {
            repo: Arc::new(faults.clone()),
            config,
        });

        // Standalone recorder so parallel test servers do not fight over the global one
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            faults,
            fixtures,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL under `/api/v1/workspaces/{workspace_id}`.
    pub fn workspace_url(&self, workspace_id: &str, path: &str) -> String {
        format!("{}/api/v1/workspaces/{}{}", self.url(), workspace_id, path)
    }

    /// URL of the cluster-admin bulk update for a workspace.
    pub fn admin_tokens_url(&self, workspace_id: &str) -> String {
        format!("{}/api/v1/admin/workspaces/{}/tokens", self.url(), workspace_id)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Direct access to the backing store, bypassing HTTP.
    pub fn store(&self) -> &InMemoryTokenRepository {
        &self.store
    }

    /// Fault switches for the running server.
    pub fn faults(&self) -> &FaultyRepository {
        &self.faults
    }

    /// Seeded workspaces and tokens.
    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
