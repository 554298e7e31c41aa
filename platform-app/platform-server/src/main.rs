use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use platform_api::{auth::TokenVerifier, build_router, AppState};
use platform_core::repositories::CatalogStore;
use platform_core::services::{ClusterService, CostService, CostTags, TenantService};
use platform_infrastructure::{
    create_pool, run_migrations, CostExplorerBilling, KubeControlPlane, PgCatalogStore,
};
use platform_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration (telemetry depends on it)
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry
    let _log_guard = platform_shared::telemetry::init_telemetry(&config.logging);
    info!(env = %config.app.env, "Platform server starting...");

    // Connect to Database
    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to apply database migrations")?;
    info!("Database connection established.");

    // Backend adapters
    let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
    let cluster = Arc::new(
        KubeControlPlane::from_settings(&config.cluster)
            .await
            .context("failed to configure cluster client")?,
    );
    let billing = Arc::new(CostExplorerBilling::from_settings(&config.billing).await);

    // Services
    let tenants = Arc::new(TenantService::new(catalog.clone(), cluster.clone()));
    let costs = Arc::new(CostService::new(
        billing,
        catalog.clone(),
        CostTags::from(&config.billing),
    ));
    let clusters = Arc::new(ClusterService::new(cluster));

    if config.lifecycle.recover_on_startup {
        if let Err(e) = tenants.recover_incomplete().await {
            error!("Lifecycle recovery failed: {}", e);
        }
    }

    let verifier = if config.auth.enabled {
        Some(Arc::new(TokenVerifier::new(&config.auth.jwt_secret)))
    } else {
        warn!("Authentication is disabled; every route is public");
        None
    };

    // Create App State
    let state = AppState {
        tenants,
        costs,
        clusters,
        catalog,
        verifier,
    };
    let app = build_router(state, &config.app);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
