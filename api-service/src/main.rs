use std::sync::Arc;

use api_service::config::{load_bind_addr, load_jwt_config};
use api_service::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let jwt_config = Arc::new(load_jwt_config()?);
    info!(
        issuer = jwt_config.issuer(),
        audience = jwt_config.audience(),
        expiry_minutes = jwt_config.expiry_minutes(),
        clock_skew_seconds = jwt_config.clock_skew().as_secs(),
        "JWT validation configured"
    );

    let state = AppState::new(jwt_config)?;
    let app = build_router(state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting api-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
