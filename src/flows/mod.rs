//! User-facing actions.
//!
//! One function per Add/Update/Delete action and record kind. Each one
//! validates its input, writes to the mirror through the [`SyncExecutor`],
//! and commits to the [`LocalStore`] only once the mirror has accepted the
//! change. They are plain async functions returning the stored record; wrap
//! them in [`crate::sync::spawn_announced`] to run them in the background.

pub mod activity;
pub mod destination;
pub mod expense;
pub mod trip;

use crate::{
    core::LocalStore,
    reachability::ReachabilityGate,
    remote::{Endpoints, RemoteMirror},
    sync::{RetryPolicy, SyncExecutor},
};
use std::sync::Arc;

/// Everything a flow needs. Cheap to clone into a spawned task.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub store: LocalStore,
    pub executor: SyncExecutor,
    pub endpoints: Endpoints,
}

impl SyncContext {
    #[must_use]
    pub fn new(
        store: LocalStore,
        remote: Arc<dyn RemoteMirror>,
        gate: ReachabilityGate,
        endpoints: Endpoints,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            executor: SyncExecutor::new(remote, gate, policy),
            endpoints,
        }
    }
}
