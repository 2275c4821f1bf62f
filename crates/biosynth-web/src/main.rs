//! BioSynth web server
//!
//! Run with: cargo run -p biosynth-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use biosynth_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    info!(?config, "Starting BioSynth web server");

    let state = biosynth_web::state::AppState::from_config(&config);
    let app = biosynth_web::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
