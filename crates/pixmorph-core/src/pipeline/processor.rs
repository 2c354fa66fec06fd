//! Pipeline orchestration - decode, apply and encode as one unit of CPU work.

use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::Config;
use crate::error::{ConfigError, TransformError};
use crate::types::TransformedImage;

use super::apply::apply;
use super::decode::{format_to_string, ImageDecoder};
use super::encode::ImageEncoder;
use super::request::TransformPlan;

/// Runs a validated plan against encoded source bytes.
#[derive(Debug, Clone)]
pub struct TransformProcessor {
    decoder: ImageDecoder,
    encoder: ImageEncoder,
    max_dimension: u32,
    timeout_ms: u64,
}

impl TransformProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            encoder: ImageEncoder::new(&config.output)?,
            max_dimension: config.limits.max_image_dimension,
            timeout_ms: config.limits.process_timeout_ms,
        })
    }

    /// Process on tokio's blocking pool under the configured timeout.
    pub async fn process(
        &self,
        bytes: Vec<u8>,
        plan: TransformPlan,
    ) -> Result<TransformedImage, TransformError> {
        let worker = self.clone();
        let timeout_duration = Duration::from_millis(self.timeout_ms);

        let result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || worker.process_sync(&bytes, &plan)).await
        })
        .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Err(TransformError::Internal(format!("Task join error: {}", e))),
            Err(_) => Err(TransformError::Timeout {
                stage: "transform".to_string(),
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    /// Decode, transform and encode on the current thread.
    pub fn process_sync(
        &self,
        bytes: &[u8],
        plan: &TransformPlan,
    ) -> Result<TransformedImage, TransformError> {
        let start = Instant::now();

        let decoded = self.decoder.decode_bytes(bytes)?;
        tracing::trace!("  Decode: {:?}", start.elapsed());
        let source_format = format_to_string(decoded.format);
        let (source_width, source_height) = (decoded.width, decoded.height);

        let apply_start = Instant::now();
        let image = apply(decoded.image, plan, self.max_dimension)?;
        tracing::trace!("  Apply: {:?}", apply_start.elapsed());

        let encode_start = Instant::now();
        let output = self.encoder.encode(&image, plan.format)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        tracing::debug!(
            "Transformed {} {}x{} -> {} {}x{} in {:?}",
            source_format,
            source_width,
            source_height,
            output.format,
            output.width,
            output.height,
            start.elapsed()
        );

        Ok(output)
    }
}
