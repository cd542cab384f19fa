//! Refreshing the local store from the mirror.
//!
//! The mirror is read-only here: destinations and their trips are fetched
//! and upserted locally. Individual bad records are skipped; only a failure
//! to list destinations at all is reported as an error.

use crate::{
    core::{destination, trip},
    errors::{Error, Result},
    flows::SyncContext,
    remote::{
        RemoteRequest,
        payloads::{ApiDestination, ApiTrip},
    },
};
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

/// What a refresh did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    /// No network path; local data was left as is
    pub offline: bool,
    pub destinations: usize,
    pub trips: usize,
    pub images_downloaded: usize,
    /// Remote records that could not be stored
    pub skipped: usize,
}

async fn fetch<T: DeserializeOwned>(ctx: &SyncContext, path: &str) -> Result<T> {
    let response = ctx.executor.remote().send(&RemoteRequest::get(path)).await?;
    if !response.is_success() {
        return Err(Error::Remote {
            message: format!("GET {path} returned status {}", response.status),
        });
    }
    response.json()
}

/// Pulls destinations and their trips from the mirror into the local store.
///
/// Missing destination images are downloaded from their URL; a failed
/// download is logged and the destination kept without an image.
///
/// # Errors
/// Fails if the destination list cannot be fetched or a local write fails.
#[instrument(skip(ctx))]
pub async fn refresh_from_remote(ctx: &SyncContext) -> Result<PullReport> {
    let mut report = PullReport::default();

    if !ctx.executor.is_reachable() {
        info!("No network path, using local data");
        report.offline = true;
        return Ok(report);
    }

    let destinations: Vec<ApiDestination> = fetch(ctx, &ctx.endpoints.destinations()).await?;

    for remote in destinations {
        let Some(destination_id) = remote.numeric_id() else {
            warn!(id = ?remote.id, city = %remote.city, "Skipping destination with unusable id");
            report.skipped += 1;
            continue;
        };

        let stored = match destination::upsert_destination(
            &ctx.store,
            destination_id,
            remote.city.clone(),
            remote.country.clone(),
            remote.image_url(),
        )
        .await
        {
            Ok((stored, _)) => stored,
            Err(e) => {
                warn!(destination_id, "Skipping destination: {e}");
                report.skipped += 1;
                continue;
            }
        };
        report.destinations += 1;

        if let (None, Some(url)) = (&stored.image, &stored.image_url) {
            match ctx.executor.remote().download(url).await {
                Ok(bytes) => {
                    match destination::set_destination_image(&ctx.store, destination_id, bytes)
                        .await
                    {
                        Ok(_) => report.images_downloaded += 1,
                        Err(e) => {
                            warn!(destination_id, "Skipping downloaded image: {e}");
                            report.skipped += 1;
                        }
                    }
                }
                Err(e) => warn!(destination_id, %url, "Image download failed: {e}"),
            }
        }

        if let Err(e) = pull_trips(ctx, destination_id, &mut report).await {
            warn!(destination_id, "Failed to refresh trips: {e}");
        }
    }

    info!(
        destinations = report.destinations,
        trips = report.trips,
        skipped = report.skipped,
        "Refreshed from mirror"
    );
    Ok(report)
}

async fn pull_trips(ctx: &SyncContext, destination_id: i64, report: &mut PullReport) -> Result<()> {
    let trips: Vec<ApiTrip> = fetch(ctx, &ctx.endpoints.trips(destination_id)).await?;

    for remote in trips {
        let Some((trip_id, mut incoming)) = remote.to_new_trip() else {
            warn!(id = %remote.id, "Skipping trip with unusable id or dates");
            report.skipped += 1;
            continue;
        };
        // The collection it was listed under decides the parent
        incoming.destination_id = destination_id;

        match trip::upsert_trip(&ctx.store, trip_id, &incoming).await {
            Ok(_) => report.trips += 1,
            Err(e) => {
                warn!(trip_id, "Skipping trip: {e}");
                report.skipped += 1;
            }
        }
    }
    Ok(())
}
