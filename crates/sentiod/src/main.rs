use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod config;
mod dbus_interface;
mod engine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("sentiod starting");

    let config = config::Config::from_env();
    let handle = engine::spawn_engine(&config).context("engine startup failed")?;

    let service = dbus_interface::PerceptionService::new(handle);
    let _conn = zbus::connection::Builder::session()
        .context("failed to connect to session bus")?
        .name("org.sentio.Perception1")?
        .serve_at("/org/sentio/Perception1", service)?
        .build()
        .await
        .context("failed to register D-Bus service")?;

    tracing::info!("sentiod ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("sentiod shutting down");

    Ok(())
}
