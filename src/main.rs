use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use travel_ledger::{
    config::settings,
    core::{LocalStore, ListQuery, destination, trip},
    errors::Result,
    flows::SyncContext,
    reachability::ReachabilityObserver,
    remote::{Endpoints, HttpMirror},
    sync::{RetryPolicy, refresh_from_remote},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal: variables can be set externally
    dotenv().ok();

    // 3. Load settings from travel.toml and the environment
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Open the local store; nothing works without it
    let store = LocalStore::open(&settings.database_url)
        .await
        .inspect(|_| info!("Local store opened"))
        .inspect_err(|e| error!("Failed to open local store: {e}"))?;

    // 5. Start watching the network path
    let (observer, gate) = ReachabilityObserver::new(&settings.reachability);
    observer.refresh().await;
    let _observer_task = observer.spawn();

    // 6. Wire up the mirror
    let remote = HttpMirror::new(&settings.remote)?;
    let ctx = SyncContext::new(
        store,
        Arc::new(remote),
        gate,
        Endpoints::from_settings(&settings.remote),
        RetryPolicy::from_settings(&settings.sync),
    );

    // 7. Refresh from the mirror; local data is still usable if this fails
    match refresh_from_remote(&ctx).await {
        Ok(report) if report.offline => info!("Offline, using local data"),
        Ok(report) => info!(
            destinations = report.destinations,
            trips = report.trips,
            images = report.images_downloaded,
            skipped = report.skipped,
            "Mirror refresh complete"
        ),
        Err(e) => warn!("Mirror refresh failed, using local data: {e}"),
    }

    let destinations = destination::list_destinations(&ctx.store, &ListQuery::default()).await?;
    let trips = trip::list_trips(&ctx.store, &ListQuery::default()).await?;
    info!(
        destinations = destinations.len(),
        trips = trips.len(),
        "Local store ready"
    );

    Ok(())
}
