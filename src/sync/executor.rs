//! One remote write followed by one local commit.

use crate::{
    errors::{Error, Result},
    reachability::ReachabilityGate,
    remote::{RemoteMirror, RemoteRequest, RemoteResponse},
    sync::retry::RetryPolicy,
};
use std::{fmt, future::Future, sync::Arc};
use tracing::{debug, info, instrument, warn};

/// What to do when the gate reports no network path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflinePolicy {
    /// Fail with [`Error::ConnectionRequired`]; nothing is stored.
    Abort,
    /// Skip the mirror and commit locally only.
    CommitLocally,
}

/// A described remote write.
#[derive(Debug, Clone)]
pub struct SyncOp {
    /// Human phrase used in messages, e.g. `"add trips"`
    pub action: String,
    pub request: RemoteRequest,
    pub offline: OfflinePolicy,
}

impl SyncOp {
    #[must_use]
    pub fn new(action: impl Into<String>, request: RemoteRequest) -> Self {
        Self {
            action: action.into(),
            request,
            offline: OfflinePolicy::Abort,
        }
    }

    #[must_use]
    pub const fn commit_locally_when_offline(mut self) -> Self {
        self.offline = OfflinePolicy::CommitLocally;
        self
    }
}

/// Runs [`SyncOp`]s against the mirror with a shared retry budget.
#[derive(Clone)]
pub struct SyncExecutor {
    remote: Arc<dyn RemoteMirror>,
    gate: ReachabilityGate,
    policy: RetryPolicy,
}

impl fmt::Debug for SyncExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncExecutor")
            .field("gate", &self.gate.status())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SyncExecutor {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteMirror>, gate: ReachabilityGate, policy: RetryPolicy) -> Self {
        Self {
            remote,
            gate,
            policy,
        }
    }

    #[must_use]
    pub fn remote(&self) -> &dyn RemoteMirror {
        self.remote.as_ref()
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.gate.is_reachable()
    }

    /// # Errors
    /// [`Error::ConnectionRequired`] naming `action` when offline.
    pub fn ensure_reachable(&self, action: &str) -> Result<()> {
        if self.is_reachable() {
            return Ok(());
        }
        info!(action, "No network path");
        Err(Error::ConnectionRequired {
            action: action.to_string(),
        })
    }

    /// Sends `op.request` until it gets a 2xx response or the retry budget
    /// is spent. Transport failures and non-2xx statuses both count as a
    /// failed attempt.
    pub async fn send_with_retry(&self, op: &SyncOp) -> Result<RemoteResponse> {
        let remote = self.remote.as_ref();
        let request = &op.request;

        self.policy
            .run(&op.action, move |attempt| async move {
                debug!(%request, attempt, "Sending");
                let response = remote.send(request).await?;
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(Error::Remote {
                        message: format!("{request} returned status {}", response.status),
                    })
                }
            })
            .await
    }

    /// Performs `op` and then `commit`.
    ///
    /// `commit` runs at most once: with the mirror's response after a
    /// successful write, or with `None` when offline under
    /// [`OfflinePolicy::CommitLocally`]. It never runs when the write fails.
    #[instrument(skip(self, op, commit), fields(action = %op.action))]
    pub async fn execute<T, C, Fut>(&self, op: &SyncOp, commit: C) -> Result<T>
    where
        C: FnOnce(Option<RemoteResponse>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.is_reachable() {
            return match op.offline {
                OfflinePolicy::Abort => Err(Error::ConnectionRequired {
                    action: op.action.clone(),
                }),
                OfflinePolicy::CommitLocally => {
                    warn!("No network path, saving locally only");
                    commit(None).await
                }
            };
        }

        let response = self.send_with_retry(op).await?;
        commit(Some(response)).await
    }
}
