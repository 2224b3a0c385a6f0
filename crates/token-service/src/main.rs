//! Token service entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use token_service::config::{Config, StoreBackend};
use token_service::crypto;
use token_service::models::TokenType;
use token_service::observability::init_metrics_recorder;
use token_service::repositories::{InMemoryTokenRepository, PgTokenRepository, TokenRepository};
use token_service::routes::{self, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Workspace that owns the bootstrap cluster admin token in the memory store.
const BOOTSTRAP_WORKSPACE: &str = "cluster-admin";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting token service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        store = ?config.store,
        bind_address = %config.bind_address,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let repo: Arc<dyn TokenRepository> = match config.store {
        StoreBackend::Postgres => Arc::new(connect_postgres(&config).await?),
        StoreBackend::Memory => Arc::new(bootstrap_memory_store(&config).await?),
    };

    let bind_address = config.bind_address.clone();
    let drain_seconds = config.drain_seconds;

    let state = Arc::new(AppState { repo, config });
    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Token service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    info!("Token service shutdown complete");

    Ok(())
}

async fn connect_postgres(config: &Config) -> Result<PgTokenRepository, Box<dyn std::error::Error>> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL is required for the postgres store")?;

    info!("Connecting to database...");
    let db_url_with_timeout = add_query_timeout(database_url, config.db_query_timeout_seconds);
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_url_with_timeout)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    info!("Database connection established");
    Ok(PgTokenRepository::new(pool))
}

/// Build the memory store, seeding a cluster admin token when a bootstrap key
/// is configured.
async fn bootstrap_memory_store(
    config: &Config,
) -> Result<InMemoryTokenRepository, Box<dyn std::error::Error>> {
    warn!("Using in-memory token store; tokens are lost on restart");
    let repo = InMemoryTokenRepository::new();

    let Some(admin_key) = config.bootstrap_admin_key.as_deref() else {
        warn!("BOOTSTRAP_ADMIN_KEY not set; no token can authenticate");
        return Ok(repo);
    };

    let signing_key = crypto::generate_signing_key()?;
    let workspace = repo
        .insert_workspace(
            BOOTSTRAP_WORKSPACE,
            "Cluster administration",
            &signing_key,
        )
        .await;
    let token = repo
        .insert_token(workspace.id, TokenType::ClusterAdmin, true, admin_key)
        .await;

    info!(
        workspace_id = %workspace.external_id,
        token_id = %token.external_id,
        "Seeded bootstrap cluster admin token"
    );
    Ok(repo)
}

/// Resolves on SIGINT or SIGTERM, after the configured drain period.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    }
}

/// Appends a per-statement timeout to the database URL.
fn add_query_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}options=-c%20statement_timeout%3D{}s",
        url, separator, timeout_secs
    )
}
