use anyhow::Context;

use staffsync_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    staffsync_observability::init(config.log_format);
    tracing::info!(posture = ?config.posture, "starting staffsync-api");
    if !config.posture.is_production() {
        tracing::warn!("development posture: dev JWT secret and seed credentials may be in use");
    }

    let app = staffsync_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
