//! Tasklist service binary.
//!
//! Wires the Axum router to the PostgreSQL repository, runs migrations
//! and serves until shutdown.

use tasklist_postgres::PostgresRepository;
use tasklist_web::{AppConfig, AppState, api_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let repo = PostgresRepository::connect(&config.database_url).await?;
    repo.migrate().await?;

    let app = api_router(AppState::new(repo));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
