//! Destination actions.
//!
//! Destinations carry an image. It is uploaded to the image host first
//! (retried under the same policy as the mirror write) and the resulting URL
//! is sent along with the record. The mirror assigns destination ids.

use crate::{
    core::destination::{self, DestinationChanges, NewDestination},
    entities::destination as destination_entity,
    errors::{Error, Result},
    flows::SyncContext,
    remote::{RemoteRequest, payloads::ApiDestination},
    sync::SyncOp,
};
use tracing::info;

/// Input of the Add Destination action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationInput {
    pub city: String,
    pub country: String,
    /// JPEG bytes
    pub image: Vec<u8>,
}

/// Input of the Update Destination action. A new image is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationUpdate {
    pub city: String,
    pub country: String,
    pub image: Option<Vec<u8>>,
}

async fn upload_image(ctx: &SyncContext, image: &[u8]) -> Result<String> {
    let remote = ctx.executor.remote();
    ctx.executor
        .policy()
        .run("upload image", move |_| remote.upload_image(image))
        .await
}

/// Uploads the image, creates the destination on the mirror, and stores it
/// locally under the id the mirror returned.
pub async fn add_destination(
    ctx: &SyncContext,
    input: DestinationInput,
) -> Result<destination_entity::Model> {
    destination::validate_destination_fields(&input.city, &input.country)?;
    if input.image.is_empty() {
        return Err(Error::validation("Please select an image"));
    }
    ctx.executor.ensure_reachable("add destinations")?;

    let image_url = upload_image(ctx, &input.image).await?;
    let payload = ApiDestination {
        id: None,
        city: input.city.trim().to_string(),
        country: input.country.trim().to_string(),
        image_url: image_url.clone(),
    };
    let op = SyncOp::new(
        "add destinations",
        RemoteRequest::post(ctx.endpoints.destinations(), &payload)?,
    );

    let stored = ctx
        .executor
        .execute(&op, move |response| async move {
            let created: ApiDestination = response
                .ok_or_else(|| Error::Remote {
                    message: "Destination was not created on the mirror".to_string(),
                })?
                .json()?;
            let destination_id = created.numeric_id().ok_or_else(|| Error::Remote {
                message: format!("Mirror returned an unusable destination id {:?}", created.id),
            })?;

            destination::insert_destination(
                &ctx.store,
                NewDestination {
                    id: destination_id,
                    city: input.city,
                    country: input.country,
                    image: Some(input.image),
                    image_url: Some(image_url),
                },
            )
            .await
        })
        .await?;

    info!(id = stored.id, "Destination added");
    Ok(stored)
}

/// Uploads a replacement image if one is given, then updates the mirror and
/// the local record.
pub async fn update_destination(
    ctx: &SyncContext,
    destination_id: i64,
    update: DestinationUpdate,
) -> Result<destination_entity::Model> {
    destination::validate_destination_fields(&update.city, &update.country)?;
    let existing = destination::require_destination(&ctx.store, destination_id).await?;
    ctx.executor.ensure_reachable("update destinations")?;

    let image_url = match &update.image {
        Some(image) => Some(upload_image(ctx, image).await?),
        None => existing.image_url,
    };
    let payload = ApiDestination {
        id: Some(destination_id.to_string()),
        city: update.city.trim().to_string(),
        country: update.country.trim().to_string(),
        image_url: image_url.clone().unwrap_or_default(),
    };
    let op = SyncOp::new(
        "update destinations",
        RemoteRequest::put(ctx.endpoints.destination(destination_id), &payload)?,
    );

    ctx.executor
        .execute(&op, move |_| {
            destination::update_destination(
                &ctx.store,
                destination_id,
                DestinationChanges {
                    city: Some(update.city),
                    country: Some(update.country),
                    image: update.image,
                    image_url,
                },
            )
        })
        .await
}

/// Deletes a destination that has no trips, on the mirror and then locally.
pub async fn delete_destination(ctx: &SyncContext, destination_id: i64) -> Result<()> {
    destination::check_destination_deletable(&ctx.store, destination_id).await?;

    let op = SyncOp::new(
        "delete destinations",
        RemoteRequest::delete(ctx.endpoints.destination(destination_id)),
    );
    ctx.executor
        .execute(&op, |_| destination::delete_destination(&ctx.store, destination_id))
        .await
}
