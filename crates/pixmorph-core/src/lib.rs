//! Pixmorph Core - on-the-fly image transformation library.
//!
//! Pixmorph takes an image that was stored earlier, applies the pixel
//! transformations a caller asks for, and returns the re-encoded bytes:
//!
//! ```text
//! Rate limit → Validate → Lookup → Fetch → Decode → Resize → Crop → Rotate
//!            → Grayscale → Sepia → Encode → bytes + content type
//! ```
//!
//! Authentication, persistence and upload live outside this crate. The core
//! receives an already-verified [`CallerId`] and reaches storage through the
//! [`ImageStore`] and [`ImageSource`] traits.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pixmorph_core::{CallerId, Config, ImageId, MemoryImageStore, Pixmorph, TransformationRequest};
//!
//! #[tokio::main]
//! async fn main() -> pixmorph_core::Result<()> {
//!     let config = Config::load()?;
//!     let pixmorph = Pixmorph::new(config, Arc::new(MemoryImageStore::new()))?;
//!
//!     let request = TransformationRequest::from_json(r#"{"resize":{"width":200,"height":100}}"#)?;
//!     let image = pixmorph
//!         .submit(&CallerId::new("user-1"), &ImageId::new("img-1"), &request)
//!         .await?;
//!     println!("{} bytes of {}", image.bytes.len(), image.content_type);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod rate_limit;
pub mod source;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::borrow::Cow;
use std::sync::Arc;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, ErrorKind, ErrorResponse, PixmorphError, Result, TransformError, TransformResult,
};
pub use pipeline::{OutputFormat, RequestValidator, TransformPlan, TransformProcessor, TransformationRequest};
pub use rate_limit::RateLimiter;
pub use source::{FileSource, HttpSource, ImageSource, SourceRouter};
pub use store::{ImageStore, JsonCatalog, MemoryImageStore};
pub use types::{CallerId, ImageId, ImageRecord, TransformedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pixmorph service - the main entry point for transformations.
///
/// Owns the rate limiter, so one instance should serve all callers.
pub struct Pixmorph {
    config: Config,
    limiter: RateLimiter,
    validator: RequestValidator,
    processor: TransformProcessor,
    store: Arc<dyn ImageStore>,
    source: Arc<dyn ImageSource>,
}

impl Pixmorph {
    /// Create a service that fetches through the default [`SourceRouter`].
    pub fn new(config: Config, store: Arc<dyn ImageStore>) -> Result<Self> {
        let source = Arc::new(SourceRouter::new(&config.storage));
        Self::with_source(config, store, source)
    }

    /// Create a service with a custom image source.
    pub fn with_source(
        config: Config,
        store: Arc<dyn ImageStore>,
        source: Arc<dyn ImageSource>,
    ) -> Result<Self> {
        tracing::debug!("Initializing Pixmorph v{}", VERSION);
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            validator: RequestValidator::new(config.limits.clone()),
            processor: TransformProcessor::new(&config)?,
            config,
            store,
            source,
        })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transform a stored image on behalf of `caller`.
    ///
    /// Rejections by the rate limiter or the validator happen before any
    /// lookup or retrieval. The record's owner is not compared with
    /// `caller`; any authenticated caller may transform any image.
    pub async fn submit(
        &self,
        caller: &CallerId,
        image_id: &ImageId,
        request: &TransformationRequest,
    ) -> TransformResult<TransformedImage> {
        tracing::debug!("Submit: image {} for {}", image_id, caller);
        self.limiter.check(caller)?;
        let plan = self.validator.validate(request)?;

        let record = self
            .store
            .get(image_id)
            .await?
            .ok_or_else(|| TransformError::ImageNotFound {
                id: image_id.to_string(),
            })?;

        self.run(&record.location, plan).await
    }

    /// Transform the image at `location` directly, skipping the record lookup.
    ///
    /// Meant for operator-supplied locations. With no storage endpoint
    /// configured, a bare location is read as a local path; catalog records
    /// going through [`submit`](Self::submit) only reach the filesystem with
    /// an explicit `file://` URI.
    pub async fn transform_location(
        &self,
        caller: &CallerId,
        location: &str,
        request: &TransformationRequest,
    ) -> TransformResult<TransformedImage> {
        tracing::debug!("Transform: {} for {}", location, caller);
        self.limiter.check(caller)?;
        let plan = self.validator.validate(request)?;
        let location = self.operator_location(location);
        self.run(&location, plan).await
    }

    fn operator_location<'a>(&self, location: &'a str) -> Cow<'a, str> {
        if location.contains("://") || !self.config.storage.endpoint.is_empty() {
            Cow::Borrowed(location)
        } else {
            Cow::Owned(format!("file://{location}"))
        }
    }

    async fn run(&self, location: &str, plan: TransformPlan) -> TransformResult<TransformedImage> {
        let start = std::time::Instant::now();
        let bytes = self.source.fetch(location).await?;
        tracing::trace!("  Fetch ({}): {} bytes in {:?}", self.source.name(), bytes.len(), start.elapsed());
        self.processor.process(bytes, plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_fixture;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_pixmorph_new() {
        let pixmorph = Pixmorph::new(Config::default(), Arc::new(MemoryImageStore::new())).unwrap();
        assert_eq!(pixmorph.config().rate_limit.max_requests, 10);
    }

    #[test]
    fn test_bad_background_fails_construction() {
        let mut config = Config::default();
        config.output.background = "white".to_string();
        let result = Pixmorph::new(config, Arc::new(MemoryImageStore::new()));
        assert!(matches!(result, Err(PixmorphError::Config(_))));
    }

    #[tokio::test]
    async fn test_transform_location_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        std::fs::write(&path, png_fixture(24, 16)).unwrap();

        let pixmorph = Pixmorph::new(Config::default(), Arc::new(MemoryImageStore::new())).unwrap();
        let request = TransformationRequest::from_json(r#"{"format":"png","rotate":90}"#).unwrap();
        let out = pixmorph
            .transform_location(&CallerId::new("local"), path.to_str().unwrap(), &request)
            .await
            .unwrap();
        assert_eq!(out.content_type, "image/png");
        assert_eq!((out.width, out.height), (16, 24));
    }

    #[tokio::test]
    async fn test_catalog_record_cannot_name_bare_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        std::fs::write(&path, png_fixture(8, 8)).unwrap();

        let store = MemoryImageStore::new();
        store.insert(ImageRecord {
            id: ImageId::new("img-1"),
            owner: CallerId::new("someone"),
            location: path.to_str().unwrap().to_string(),
            provider_id: "p-1".to_string(),
        });
        let pixmorph = Pixmorph::new(Config::default(), Arc::new(store)).unwrap();
        let err = pixmorph
            .submit(
                &CallerId::new("local"),
                &ImageId::new("img-1"),
                &TransformationRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Retrieval { .. }));
    }

    #[test]
    fn test_operator_location() {
        let local = Pixmorph::new(Config::default(), Arc::new(MemoryImageStore::new())).unwrap();
        assert_eq!(local.operator_location("a.png"), "file://a.png");
        assert_eq!(local.operator_location("https://x/a.png"), "https://x/a.png");

        let mut config = Config::default();
        config.storage.endpoint = "https://store.example.com".to_string();
        let remote = Pixmorph::new(config, Arc::new(MemoryImageStore::new())).unwrap();
        assert_eq!(remote.operator_location("users/1/a.png"), "users/1/a.png");
    }
}
