//! Sync layer - remote-then-local writes and the remote pull.
//!
//! Every user action goes through the same sequence: check the reachability
//! gate, attempt the remote write under a bounded [`RetryPolicy`], and only
//! then commit to the local store.

pub mod announce;
pub mod executor;
pub mod pull;
pub mod retry;

pub use announce::{Announcement, Announcer, spawn_announced};
pub use executor::{OfflinePolicy, SyncExecutor, SyncOp};
pub use pull::{PullReport, refresh_from_remote};
pub use retry::RetryPolicy;
