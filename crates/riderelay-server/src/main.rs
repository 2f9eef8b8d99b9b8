use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use riderelay_core::TokenSigner;
use riderelay_db::{Database, DatabaseConfig};
use riderelay_server::config::ServerConfig;
use riderelay_server::routes;
use riderelay_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("riderelay=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let signer = TokenSigner::new(&config.token_secret)?;
    let cors = config.cors_layer()?;

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let state = Arc::new(AppState::new(db, signer));

    let app = routes::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
