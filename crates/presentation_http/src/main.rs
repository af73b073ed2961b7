//! TaxiFare HTTP server

use std::{net::SocketAddr, time::Duration};

use infrastructure::{AppConfig, Services, init_logging};
use presentation_http::{
    routes,
    state::AppState,
    tasks::{spawn_featured_trip_refresh_task, spawn_limiter_cleanup_task},
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    info!("🚕 TaxiFare v{} starting...", env!("CARGO_PKG_VERSION"));

    let services = Services::build(&config)?;

    info!(
        host = %config.server.host,
        port = %config.server.port,
        database = %config.database.path,
        "Configuration loaded"
    );

    let mut background = Vec::new();
    let limiter_window = config.geocoding.rate_limiter_config().window;
    background.push(spawn_limiter_cleanup_task(
        services.limiter.clone(),
        limiter_window,
        limiter_window,
    ));
    if config.refresher.enabled {
        background.push(spawn_featured_trip_refresh_task(
            services.tariffs.clone(),
            services.refresher.clone(),
            Duration::from_secs(config.refresher.interval_secs),
        ));
    }

    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let app = routes::create_router(AppState::new(services, config));

    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
    .await?;

    for task in background {
        task.abort();
    }

    info!("👋 Server shutdown complete");

    Ok(())
}

async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("⏳ Waiting up to {:?} for connections to close...", timeout);
}
