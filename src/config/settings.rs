//! Application settings loaded from `travel.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! A handful of deployment-specific values can be overridden from the
//! environment (after `.env` has been loaded).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "travel.toml";

/// Top-level settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `SeaORM` connection string for the local store
    pub database_url: String,
    pub remote: RemoteSettings,
    pub sync: SyncSettings,
    pub reachability: ReachabilitySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: super::database::DEFAULT_DATABASE_URL.to_string(),
            remote: RemoteSettings::default(),
            sync: SyncSettings::default(),
            reachability: ReachabilitySettings::default(),
        }
    }
}

/// Remote mirror endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL the collection paths are appended to
    pub base_url: String,
    /// Path segment of the destination collection
    pub destinations_segment: String,
    /// Path segment of the per-destination trip collection
    pub trips_segment: String,
    pub activities_segment: String,
    pub expenses_segment: String,
    /// Image hosting upload endpoint (multipart, field `image`)
    pub image_upload_url: String,
    /// Optional API key appended to the upload URL as `?key=`
    pub image_api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/travel".to_string(),
            destinations_segment: "destinations".to_string(),
            trips_segment: "trips".to_string(),
            activities_segment: "activities".to_string(),
            expenses_segment: "expenses".to_string(),
            image_upload_url: "https://api.imgbb.com/1/upload".to_string(),
            image_api_key: None,
            timeout_secs: 10,
        }
    }
}

impl RemoteSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Bounded retry budget for remote writes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_secs: 2,
        }
    }
}

/// Network path observer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReachabilitySettings {
    /// `host:port` the observer tries to open a TCP connection to
    pub probe_address: String,
    pub probe_interval_secs: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ReachabilitySettings {
    fn default() -> Self {
        Self {
            probe_address: "1.1.1.1:443".to_string(),
            probe_interval_secs: 5,
            probe_timeout_ms: 1500,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {DEFAULT_SETTINGS_FILE}: {e}"),
    })
}

/// Loads `./travel.toml` if present (defaults otherwise) and applies
/// environment overrides.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::info!("No {DEFAULT_SETTINGS_FILE} found, using defaults");
        Settings::default()
    };
    Ok(apply_env_overrides(settings, |key| std::env::var(key).ok()))
}

/// Applies `DATABASE_URL`, `TRAVEL_API_BASE_URL` and `IMAGE_API_KEY`.
///
/// The lookup is injected so tests do not have to touch the process
/// environment.
pub fn apply_env_overrides<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        settings.database_url = url;
    }
    if let Some(base_url) = lookup("TRAVEL_API_BASE_URL") {
        settings.remote.base_url = base_url;
    }
    if let Some(key) = lookup("IMAGE_API_KEY").filter(|key| !key.trim().is_empty()) {
        settings.remote.image_api_key = Some(key);
    }
    settings
}
