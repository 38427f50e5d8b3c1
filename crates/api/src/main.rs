use std::sync::Arc;

use anyhow::Context;

use stocktally_api::app::{build_app, services::AppServices};
use stocktally_observability::LogSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = stocktally_infra::load_config().context("failed to load configuration")?;

    stocktally_observability::init(&LogSettings {
        level: config.log_level.clone(),
        json: config.log_json,
    });
    tracing::info!(run_env = %config.run_env, config = ?config, "configuration loaded");

    let services = AppServices::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    let app = build_app(Arc::new(services), config.jwt_secret.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
