use pipeline_reports::{
    config::{get_config, init_config},
    database::pool::create_pool,
    router, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    init_config()?;
    let config = get_config();
    let settings = config.report_settings()?;

    let pool = create_pool().await?;
    let app = router(AppState::new(pool, settings));

    let addr: SocketAddr = config.server_address.parse()?;
    info!(
        utc_offset = %settings.utc_offset,
        max_limit = settings.max_limit,
        "Server listening on {}",
        addr
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
