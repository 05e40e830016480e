use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use fixitright::config::AppConfig;
use fixitright::db::{self, queries};
use fixitright::handlers;
use fixitright::models::UserRole;
use fixitright::services::identity::HeaderIdentity;
use fixitright::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let grid = config.slot_grid()?;

    let conn = db::init_db(&config.database_url)?;

    if let Some(admin_id) = &config.bootstrap_admin_id {
        if queries::set_profile_role(&conn, admin_id, UserRole::Admin)? {
            tracing::info!(user_id = %admin_id, "promoted bootstrap admin");
        } else {
            tracing::warn!(user_id = %admin_id, "bootstrap admin has no profile yet");
        }
    }

    tracing::info!(
        open = grid.open_hour(),
        close = grid.close_hour(),
        guard = ?config.slot_guard,
        "work calendar configured"
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        grid,
        identity: Box::new(HeaderIdentity),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
