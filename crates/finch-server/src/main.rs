mod config;

use std::sync::Arc;

use tracing::{info, warn};

use finch_api::auth::{AppState, AppStateInner};
use finch_api::router::router;
use finch_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "finch_server=debug,finch_api=debug,finch_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_dev_secret() {
        warn!("FINCH_SECRET is not set; sessions are signed with the development secret");
    }

    // A database that can't be opened is fatal for the whole process
    let db = Database::open(&config.db_file)?;

    let app_state: AppState = Arc::new(AppStateInner {
        db,
        session_secret: config.secret.clone(),
        base_url: config.base_url.clone(),
        items_per_page: config.items_per_page,
    });

    let app = router(app_state.clone(), &config.media_dir);

    let addr = config.addr()?;
    info!("Finch listening on {} ({})", addr, config.base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(app_state) {
        Ok(state) => state.db.close()?,
        Err(_) => warn!("Database still shared at shutdown; leaving it to drop"),
    }

    info!("Finch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
