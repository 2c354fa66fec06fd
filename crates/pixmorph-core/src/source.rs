//! Image source resolution.
//!
//! An [`ImageSource`] turns an image record's `location` into the raw encoded
//! bytes. Remote locations go through [`HttpSource`]; local files through
//! [`FileSource`]. [`SourceRouter`] picks between them per location.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::error::TransformError;

/// Fetches raw encoded image bytes from wherever they are stored.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Retrieve the complete byte payload at `location`.
    ///
    /// Any failure, including an empty or truncated payload, is a
    /// [`TransformError::Retrieval`]. Implementations never retry.
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, TransformError>;
}

fn retrieval(location: &str, message: impl Into<String>) -> TransformError {
    TransformError::Retrieval {
        location: location.to_string(),
        message: message.into(),
    }
}

fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetches from an HTTP object store.
pub struct HttpSource {
    endpoint: String,
    timeout_ms: u64,
    max_bytes: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
            max_bytes: config.max_download_bytes(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the download cap.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Absolute URLs pass through; anything else is joined onto the endpoint.
    fn resolve_url(&self, location: &str) -> Result<String, TransformError> {
        if is_http(location) {
            return Ok(location.to_string());
        }
        if self.endpoint.is_empty() {
            return Err(retrieval(
                location,
                "relative location but no storage endpoint is configured",
            ));
        }
        Ok(format!(
            "{}/{}",
            self.endpoint,
            location.trim_start_matches('/')
        ))
    }
}

#[async_trait]
impl ImageSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>, TransformError> {
        let url = self.resolve_url(location)?;
        tracing::debug!("Fetching {url}");

        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| retrieval(location, format!("request failed: {e}")))?;

        match resp.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => {
                return Err(retrieval(location, "object not found (HTTP 404)"));
            }
            status => {
                return Err(retrieval(location, format!("unexpected status: {status}")));
            }
        }

        let declared = resp.content_length();
        if let Some(len) = declared {
            if len > self.max_bytes {
                return Err(retrieval(
                    location,
                    format!("payload of {len} bytes exceeds limit of {} bytes", self.max_bytes),
                ));
            }
        }

        let capacity = declared.unwrap_or(0).min(self.max_bytes) as usize;
        let mut body = Vec::with_capacity(capacity);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| retrieval(location, format!("body read failed: {e}")))?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(retrieval(
                    location,
                    format!("payload exceeds limit of {} bytes", self.max_bytes),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(retrieval(location, "empty payload"));
        }
        if let Some(len) = declared {
            if body.len() as u64 != len {
                return Err(retrieval(
                    location,
                    format!("truncated payload: got {} of {len} bytes", body.len()),
                ));
            }
        }

        Ok(body)
    }
}

/// Reads from the local filesystem. Accepts `file://` URIs and plain paths.
#[derive(Debug, Default, Clone)]
pub struct FileSource;

impl FileSource {
    fn resolve_path(location: &str) -> PathBuf {
        let path = location.strip_prefix("file://").unwrap_or(location);
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }
}

#[async_trait]
impl ImageSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>, TransformError> {
        let path = Self::resolve_path(location);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| retrieval(location, e.to_string()))?;
        if bytes.is_empty() {
            return Err(retrieval(location, "empty payload"));
        }
        Ok(bytes)
    }
}

/// Dispatches each location to the HTTP or file source.
///
/// Only `file://` URIs reach the filesystem. Everything else, bare keys
/// included, goes to HTTP and is resolved against the storage endpoint.
pub struct SourceRouter {
    http: HttpSource,
    file: FileSource,
}

impl SourceRouter {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: HttpSource::new(config),
            file: FileSource,
        }
    }

    fn route(&self, location: &str) -> &dyn ImageSource {
        if location.starts_with("file://") {
            return &self.file;
        }
        &self.http
    }
}

#[async_trait]
impl ImageSource for SourceRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>, TransformError> {
        self.route(location).fetch(location).await
    }
}
