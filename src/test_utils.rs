//! Shared test utilities for the travel ledger.
//!
//! In-memory stores, record fixtures with sensible defaults, and a scripted
//! [`RemoteMirror`] that records what it was asked to do.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        LocalStore,
        activity::{self, NewActivity},
        destination::{self, NewDestination},
        expense::{self, NewExpense},
        trip::{self, NewTrip},
    },
    entities::{self, Activity, Expense, Trip},
    errors::{Error, Result},
    flows::SyncContext,
    reachability::ReachabilityGate,
    remote::{Endpoints, RemoteMirror, RemoteRequest, RemoteResponse},
    sync::RetryPolicy,
};
use async_trait::async_trait;
use chrono::{Duration, Local, Timelike, Utc};
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::time::Instant;

/// Creates an in-memory store with all tables initialized.
pub async fn setup_test_store() -> Result<LocalStore> {
    LocalStore::open("sqlite::memory:").await
}

/// Routes `tracing` output through the test harness. Safe to call twice.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("travel_ledger=debug")
        .with_test_writer()
        .try_init();
}

/// Creates a destination in France with the given id and city.
pub async fn create_test_destination(
    store: &LocalStore,
    id: i64,
    city: &str,
) -> Result<entities::destination::Model> {
    destination::insert_destination(
        store,
        NewDestination {
            id,
            city: city.to_string(),
            country: "France".to_string(),
            image: None,
            image_url: None,
        },
    )
    .await
}

/// Creates a five-day trip starting `starts_in` from now. Negative offsets
/// give trips that have already started.
pub async fn create_test_trip(
    store: &LocalStore,
    destination_id: i64,
    title: &str,
    starts_in: Duration,
) -> Result<entities::trip::Model> {
    let id = store.next_id::<Trip>().await?;
    let start = Utc::now() + starts_in;
    trip::insert_trip(
        store,
        id,
        &NewTrip {
            destination_id,
            title: title.to_string(),
            start_date: start,
            end_date: start + Duration::days(5),
        },
    )
    .await
}

/// Creates an activity at local time now + `starts_in`, to the second.
pub async fn create_test_activity(
    store: &LocalStore,
    trip_id: i64,
    starts_in: Duration,
) -> Result<entities::activity::Model> {
    let id = store.next_id::<Activity>().await?;
    let at = (Local::now() + starts_in).naive_local();
    activity::insert_activity(
        store,
        id,
        &NewActivity {
            trip_id,
            name: format!("Activity {id}"),
            location: "Old town".to_string(),
            date: at.date(),
            time: at.time().with_nanosecond(0).unwrap(),
        },
    )
    .await
}

/// Creates a 25.00 expense dated `days_ago` days back.
pub async fn create_test_expense(
    store: &LocalStore,
    trip_id: i64,
    days_ago: i64,
) -> Result<entities::expense::Model> {
    let id = store.next_id::<Expense>().await?;
    expense::insert_expense(
        store,
        id,
        &NewExpense {
            trip_id,
            title: format!("Expense {id}"),
            amount: 25.0,
            date: Utc::now() - Duration::days(days_ago),
        },
    )
    .await
}

/// A store holding destination 1 (Paris) and one trip starting in 30 days.
pub async fn setup_with_trip() -> Result<(
    LocalStore,
    entities::destination::Model,
    entities::trip::Model,
)> {
    let store = setup_test_store().await?;
    let paris = create_test_destination(&store, 1, "Paris").await?;
    let trip = create_test_trip(&store, paris.id, "Paris in spring", Duration::days(30)).await?;
    Ok((store, paris, trip))
}

/// A flow context over `store` and `remote` with a fixed gate and a short
/// retry delay.
pub fn test_context(store: LocalStore, remote: &Arc<ScriptedRemote>, reachable: bool) -> SyncContext {
    test_context_with_delay(store, remote, reachable, std::time::Duration::from_millis(5))
}

/// Like [`test_context`], with an explicit pause between attempts.
pub fn test_context_with_delay(
    store: LocalStore,
    remote: &Arc<ScriptedRemote>,
    reachable: bool,
    delay: std::time::Duration,
) -> SyncContext {
    SyncContext::new(
        store,
        Arc::clone(remote) as Arc<dyn RemoteMirror>,
        ReachabilityGate::fixed(reachable),
        Endpoints::default(),
        RetryPolicy::new(3, delay),
    )
}

/// A [`RemoteMirror`] that answers from a script.
///
/// Queued responses are used first; once the queue is empty every request
/// gets `fallback_status`. Uploads succeed with a fixed URL unless results
/// are queued, and downloads serve only registered URLs.
pub struct ScriptedRemote {
    fallback_status: u16,
    responses: Mutex<VecDeque<Result<RemoteResponse>>>,
    requests: Mutex<Vec<(Instant, RemoteRequest)>>,
    uploads: Mutex<VecDeque<Result<String>>>,
    upload_count: AtomicUsize,
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl ScriptedRemote {
    fn with_fallback(fallback_status: u16) -> Self {
        Self {
            fallback_status,
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(VecDeque::new()),
            upload_count: AtomicUsize::new(0),
            images: Mutex::new(HashMap::new()),
        }
    }

    /// Answers 200 unless scripted otherwise.
    pub fn succeeding() -> Self {
        Self::with_fallback(200)
    }

    /// Answers 500 unless scripted otherwise.
    pub fn failing() -> Self {
        Self::with_fallback(500)
    }

    pub fn push_response(&self, status: u16, body: Option<Value>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RemoteResponse::new(status, body)));
    }

    pub fn push_transport_error(&self) {
        self.responses.lock().unwrap().push_back(Err(Error::Remote {
            message: "connection reset".to_string(),
        }));
    }

    pub fn push_upload(&self, result: Result<String>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn serve_image(&self, url: &str, bytes: Vec<u8>) {
        self.images.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    /// Number of `send` calls so far.
    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteMirror for ScriptedRemote {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(RemoteResponse::new(self.fallback_status, None)))
    }

    async fn upload_image(&self, _image: &[u8]) -> Result<String> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.uploads.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok("https://img.example/uploaded.jpg".to_string()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.images
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Remote {
                message: format!("GET {url} returned status 404"),
            })
    }
}
