mod capture;
mod config;
mod error;
mod normalize;
mod render;
mod server;
mod session;
mod static_files;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly.
    let dotenv = dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting eye-analyzer");
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        base_url = %config.vision.base_url,
        model = %config.vision.model,
        timeout_ms = config.vision.timeout.as_millis(),
        upload_dir = %config.upload_dir.display(),
        "configuration loaded"
    );

    // 2. Make sure the upload directory exists before the first request writes to it
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // 3. Build shared state and serve
    let bind_addr = config.bind_addr;
    let state = AppState::new(config)?;
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
        })?;

    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
