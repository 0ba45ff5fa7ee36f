//! zero-code-server: bootstraps settings, logging, the MySQL pool and the router.
//!
//! Run from repo root: `cargo run -p zero-code-server`

use sqlx::mysql::MySqlPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use zero_code_api::{app, AppState, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("zero_code_api=info,zero_code_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    tracing::info!(schema = %settings.database_name, max_connections = settings.max_connections, "database pool ready");

    let port = settings.port;
    let state = AppState::new(pool, settings);
    state.synthesizer.register_all().await?;

    let api_root = state.settings.api_root.clone();
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    tracing::info!(
        "zero-code-server listening on http://{}{} (docs at {}/docs)",
        listener.local_addr()?,
        api_root,
        api_root
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}
