// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use aura::db;
use aura::settings::load_settings;
use aura::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = load_settings().map_err(anyhow::Error::msg)?;

    let api_key = std::env::var("AURA_API_KEY").ok();
    if api_key.is_none() {
        tracing::warn!("AURA_API_KEY is not set; chat requests will fail until it is configured");
    }

    let db_path = db::resolve_db_path().map_err(anyhow::Error::msg)?;
    tracing::info!(path = %db_path.display(), "opening conversation store");
    {
        let conn = db::open_db(&db_path)?;
        db::init_db(&conn)?;
    }

    // Retention sweep: the first tick fires immediately, then hourly.
    {
        let retention = settings.storage.retention_days;
        let db_path = db_path.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60 * 60));
            loop {
                ticker.tick().await;
                match db::open_db(&db_path)
                    .and_then(|conn| db::purge_expired(&conn, retention))
                {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "removed expired conversations");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(%err, "retention sweep failed"),
                }
            }
        });
    }

    let port = settings.server.port;
    let state = Arc::new(AppState::new(settings, api_key, db_path));
    let app = aura::api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listen address")?;
    tracing::info!("AURA backend listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aura=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
