//! `reqwest`-backed [`RemoteMirror`].

use crate::{
    config::settings::RemoteSettings,
    errors::{Error, Result},
    remote::{
        Method, RemoteMirror, RemoteRequest, RemoteResponse, payloads::ImageUploadResponse,
    },
};
use async_trait::async_trait;
use reqwest::{Client, multipart};
use tracing::{debug, instrument, warn};

/// HTTP client for the mirror API and the image host.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    client: Client,
    base_url: String,
    image_upload_url: String,
    image_api_key: Option<String>,
}

impl HttpMirror {
    /// Builds a client with the configured per-request timeout.
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            image_upload_url: settings.image_upload_url.clone(),
            image_api_key: settings.image_api_key.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl RemoteMirror for HttpMirror {
    #[instrument(skip(self, request), fields(request = %request))]
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Response body is not JSON: {e}");
                    None
                }
            }
        };

        debug!(status, "Mirror responded");
        Ok(RemoteResponse::new(status, body))
    }

    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn upload_image(&self, image: &[u8]) -> Result<String> {
        let part = multipart::Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);

        let mut builder = self.client.post(&self.image_upload_url);
        if let Some(key) = &self.image_api_key {
            builder = builder.query(&[("key", key)]);
        }

        let response = builder.multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Image upload rejected");
            return Err(Error::Remote {
                message: format!("Image upload failed with status {status}"),
            });
        }

        let uploaded: ImageUploadResponse = response.json().await?;
        debug!(url = %uploaded.data.url, "Image uploaded");
        Ok(uploaded.data.url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
