//! Delivering a flow's outcome to whoever started it.
//!
//! The announcer is held weakly: if the screen that started a flow is gone by
//! the time the flow finishes, the message is dropped.

use crate::errors::Result;
use std::{future::Future, sync::Weak};
use tokio::task::JoinHandle;
use tracing::debug;

/// Final user-facing message of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Success(String),
    Failure(String),
}

impl Announcement {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }
}

/// Receives flow outcomes, typically by showing a modal message.
pub trait Announcer: Send + Sync {
    fn announce(&self, announcement: Announcement);
}

/// Runs `flow` on a background task and announces how it ended.
///
/// Success is announced with `success_message`, failure with the error's
/// own message.
pub fn spawn_announced<T, F>(
    announcer: Weak<dyn Announcer>,
    success_message: impl Into<String>,
    flow: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let success_message = success_message.into();
    tokio::spawn(async move {
        let announcement = match flow.await {
            Ok(_) => Announcement::Success(success_message),
            Err(e) => Announcement::Failure(e.to_string()),
        };

        match announcer.upgrade() {
            Some(announcer) => announcer.announce(announcement),
            None => debug!(?announcement, "Announcer gone, discarding outcome"),
        }
    })
}
