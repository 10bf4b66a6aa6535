use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viewvault::config::CONFIG;
use viewvault::tmdb::TmdbClient;
use viewvault::{ViewVaultState, viewvault_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        tmdb_base_url = %cfg.tmdb.base_url,
        tmdb_region = %cfg.tmdb.region,
        proxy = %cfg.tmdb.proxy.as_ref().map_or("<none>", url::Url::as_str),
        "configuration loaded"
    );

    let db = viewvault::db::spawn(&cfg.basic.database_url).await;
    let metadata = Arc::new(TmdbClient::new(&cfg.tmdb)?);

    let state = ViewVaultState::new(db, metadata, Arc::from(cfg.basic.viewvault_key.as_str()))
        .with_refresh_batch_size(cfg.tmdb.refresh_batch_size)
        .with_import_body_limit(cfg.basic.import_body_limit);
    let app = viewvault_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
