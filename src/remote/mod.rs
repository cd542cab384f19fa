//! Remote mirror - the REST API the local store is mirrored to.
//!
//! [`RemoteMirror`] is the seam the sync layer talks to. [`HttpMirror`] is the
//! production implementation; tests substitute a scripted fake.

pub mod endpoints;
pub mod http;
pub mod payloads;

pub use endpoints::Endpoints;
pub use http::HttpMirror;

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// HTTP verbs used against the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// One request against the mirror: verb, path below the base URL, and an
/// optional JSON body. Retries resend the same value unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RemoteRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// # Errors
    /// Fails if `body` cannot be serialized to JSON.
    pub fn post(path: impl Into<String>, body: &impl serde::Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// # Errors
    /// Fails if `body` cannot be serialized to JSON.
    pub fn put(path: impl Into<String>, body: &impl serde::Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::Put,
            path: path.into(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

impl fmt::Display for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Status and parsed JSON body of a mirror response.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl RemoteResponse {
    #[must_use]
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    /// Fails if there is no body or it does not have the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body.clone().ok_or_else(|| Error::Remote {
            message: format!("status {} response had no body", self.status),
        })?;
        serde_json::from_value(body).map_err(Into::into)
    }
}

/// The remote mirror as seen by the sync layer.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Performs one request. Any HTTP status is a successful `Ok`; only
    /// transport problems are errors.
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse>;

    /// Uploads JPEG bytes to the image host and returns the public URL.
    async fn upload_image(&self, image: &[u8]) -> Result<String>;

    /// Fetches the bytes behind an image URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
