use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use gerber_api::{build_router, AppState};
use gerber_infrastructure::{
    InMemoryOrderRepository, InMemoryUserRepository, QueuedAuditLog, SessionStore,
};
use gerber_shared::config::AppConfig;
use gerber_shared::{Clock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration before telemetry so the log directory is known
    let config = AppConfig::load();
    let log_dir = config.as_ref().ok().and_then(|c| c.app.log_dir.clone());
    let _log_guard = gerber_shared::telemetry::init_telemetry(log_dir.as_deref())?;

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("{} starting (env: {})...", config.app.name, config.app.env);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Session store and its staging directory
    let sessions = Arc::new(SessionStore::new(&config.session, clock.clone()));
    sessions
        .files()
        .prepare()
        .await
        .with_context(|| format!("preparing staging directory {}", config.session.staging_dir))?;
    tokio::spawn(sessions.clone().run_sweeper());

    let users = Arc::new(InMemoryUserRepository::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let audit = Arc::new(QueuedAuditLog::new(&config.audit, clock.clone()));

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    let cors = cors_layer(&config.app.allowed_origins);

    let state = AppState::new(config, sessions, users, orders, audit, clock)
        .map_err(|e| anyhow::anyhow!("wiring application state: {}", e))?;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
