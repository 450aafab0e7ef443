use std::net::SocketAddr;

use anyhow::Context;
use tokio::{signal, sync::mpsc};
use tracing::{error, info};

use warehouse_inventory as app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = app::config::load_config()?;
    app::config::init_tracing(cfg.log_level(), cfg.log_json);
    app::handlers::health::init_start_time();

    let db_pool = app::db::establish_connection_from_app_config(&cfg)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;
    if cfg.auto_migrate {
        app::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = app::events::EventSender::new(event_tx);
    let event_worker = tokio::spawn(app::events::process_events(event_rx));

    let host: std::net::IpAddr = cfg
        .host
        .parse()
        .with_context(|| format!("invalid host address '{}'", cfg.host))?;
    let addr = SocketAddr::new(host, cfg.port);

    let state = app::AppState::new(db_pool, cfg, event_sender)?;
    let router = app::build_app(state);

    info!("warehouse-inventory listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the router (and with it every event sender) is gone; let the worker drain
    if let Err(e) = event_worker.await {
        error!("event worker terminated abnormally: {}", e);
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
