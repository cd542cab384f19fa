//! Network reachability.
//!
//! [`ReachabilityGate`] is what flows consult before touching the mirror: a
//! non-blocking read of the last observed path status. The status is
//! published either by a [`ReachabilityObserver`] probing a TCP endpoint in
//! the background, or by a [`ReachabilitySwitch`] flipped by hand.

use crate::config::settings::ReachabilitySettings;
use std::time::Duration;
use tokio::{net::TcpStream, sync::watch, task::JoinHandle, time};
use tracing::{debug, info};

/// Last observed state of the network path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
}

impl PathStatus {
    const fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Self::Satisfied
        } else {
            Self::Unsatisfied
        }
    }
}

/// Read side of the reachability state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReachabilityGate {
    status: watch::Receiver<PathStatus>,
}

impl ReachabilityGate {
    /// A gate that never changes.
    #[must_use]
    pub fn fixed(reachable: bool) -> Self {
        let (_, gate) = ReachabilitySwitch::new(reachable);
        gate
    }

    #[must_use]
    pub fn status(&self) -> PathStatus {
        *self.status.borrow()
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.status() == PathStatus::Satisfied
    }
}

/// Manually driven reachability, for embedders without a probe.
#[derive(Debug)]
pub struct ReachabilitySwitch {
    sender: watch::Sender<PathStatus>,
}

impl ReachabilitySwitch {
    #[must_use]
    pub fn new(reachable: bool) -> (Self, ReachabilityGate) {
        let (sender, status) = watch::channel(PathStatus::from_reachable(reachable));
        (Self { sender }, ReachabilityGate { status })
    }

    pub fn set(&self, reachable: bool) {
        self.sender.send_replace(PathStatus::from_reachable(reachable));
    }

    #[must_use]
    pub fn gate(&self) -> ReachabilityGate {
        ReachabilityGate {
            status: self.sender.subscribe(),
        }
    }
}

/// Periodically probes a TCP endpoint and publishes the result.
#[derive(Debug)]
pub struct ReachabilityObserver {
    probe_address: String,
    interval: Duration,
    timeout: Duration,
    sender: watch::Sender<PathStatus>,
}

impl ReachabilityObserver {
    /// Creates the observer and its gate. The gate starts out unsatisfied
    /// until the first probe completes.
    #[must_use]
    pub fn new(settings: &ReachabilitySettings) -> (Self, ReachabilityGate) {
        let (sender, status) = watch::channel(PathStatus::Unsatisfied);
        let observer = Self {
            probe_address: settings.probe_address.clone(),
            interval: Duration::from_secs(settings.probe_interval_secs.max(1)),
            timeout: Duration::from_millis(settings.probe_timeout_ms),
            sender,
        };
        (observer, ReachabilityGate { status })
    }

    /// Attempts one connection within the probe timeout.
    pub async fn probe_once(&self) -> PathStatus {
        match time::timeout(self.timeout, TcpStream::connect(self.probe_address.as_str())).await {
            Ok(Ok(_)) => PathStatus::Satisfied,
            Ok(Err(e)) => {
                debug!(address = %self.probe_address, "Probe failed: {e}");
                PathStatus::Unsatisfied
            }
            Err(_) => {
                debug!(address = %self.probe_address, "Probe timed out");
                PathStatus::Unsatisfied
            }
        }
    }

    /// Probes once and publishes the result if it changed.
    pub async fn refresh(&self) -> PathStatus {
        let status = self.probe_once().await;
        let changed = self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        if changed {
            info!(?status, "Network path status changed");
        }
        status
    }

    /// Runs the probe loop on a background task until every gate is gone.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if self.sender.is_closed() {
                    debug!("No gates left, stopping reachability observer");
                    break;
                }
                self.refresh().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tokio::net::TcpListener;

    fn settings_for(probe_address: String) -> ReachabilitySettings {
        ReachabilitySettings {
            probe_address,
            probe_interval_secs: 1,
            probe_timeout_ms: 500,
        }
    }

    #[test]
    fn test_switch_drives_gate() {
        let (switch, gate) = ReachabilitySwitch::new(false);
        assert!(!gate.is_reachable());

        switch.set(true);
        assert!(gate.is_reachable());
        assert!(switch.gate().is_reachable());

        switch.set(false);
        assert_eq!(gate.status(), PathStatus::Unsatisfied);
    }

    #[test]
    fn test_fixed_gate() {
        assert!(ReachabilityGate::fixed(true).is_reachable());
        assert!(!ReachabilityGate::fixed(false).is_reachable());
    }

    #[tokio::test]
    async fn test_probe_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (observer, gate) = ReachabilityObserver::new(&settings_for(address));
        assert!(!gate.is_reachable());

        assert_eq!(observer.refresh().await, PathStatus::Satisfied);
        assert!(gate.is_reachable());
    }

    #[tokio::test]
    async fn test_probe_detects_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (observer, gate) = ReachabilityObserver::new(&settings_for(address));
        assert_eq!(observer.refresh().await, PathStatus::Unsatisfied);
        assert!(!gate.is_reachable());
    }

    #[tokio::test]
    async fn test_spawned_observer_stops_without_gates() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (observer, gate) = ReachabilityObserver::new(&settings_for(address));
        let handle = observer.spawn();

        let mut status = gate.status.clone();
        status.changed().await.unwrap();
        assert!(gate.is_reachable());

        drop(status);
        drop(gate);
        time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }
}
