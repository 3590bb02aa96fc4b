use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use picrelay_core::Config;
use picrelay_db::{SessionLookup, SessionRepository};
use picrelay_storage::create_storage;
use picrelay_worker::{telemetry, EventHandler, EventListener, ImageFetcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("Configuration load failed")?;

    let pool = picrelay_worker::setup::setup_database(&config).await?;

    let storage = create_storage(&config)
        .await
        .context("Storage setup failed")?;

    let lookup: Arc<dyn SessionLookup> = Arc::new(SessionRepository::new(
        pool.clone(),
        config.enrichment_shape,
    ));

    let fetcher = ImageFetcher::new(
        config.api_base_url.clone(),
        config.fetch_timeout_seconds.map(Duration::from_secs),
    )?;

    let handler = Arc::new(EventHandler::new(
        lookup,
        fetcher,
        storage,
        config.dest_folder.clone(),
    ));

    // Fatal if the subscription cannot be established; runs forever otherwise.
    let listener = EventListener::connect(&pool, &config.notify_channel).await?;
    listener.run(handler).await;

    Ok(())
}
