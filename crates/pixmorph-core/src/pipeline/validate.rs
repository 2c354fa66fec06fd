//! Request validation before any retrieval or decode work.

use crate::config::LimitsConfig;
use crate::error::TransformError;

use super::request::{OutputFormat, Rotation, TransformPlan, TransformationRequest};

/// Validates transformation requests and turns them into plans.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    limits: LimitsConfig,
}

impl RequestValidator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check shape and ranges of a request.
    ///
    /// Checks:
    /// - Resize dimensions are positive and within `max_image_dimension`
    /// - Crop dimensions are positive (bounds are checked at apply time)
    /// - Rotation is a finite whole number of degrees
    /// - Format, if given, is supported
    pub fn validate(
        &self,
        request: &TransformationRequest,
    ) -> Result<TransformPlan, TransformError> {
        let max_dim = self.limits.max_image_dimension;

        if let Some(resize) = request.resize {
            if resize.width == 0 || resize.height == 0 {
                return Err(TransformError::Validation(format!(
                    "resize width and height must be positive, got {}x{}",
                    resize.width, resize.height
                )));
            }
            if resize.width > max_dim || resize.height > max_dim {
                return Err(TransformError::Validation(format!(
                    "resize {}x{} exceeds maximum dimension {max_dim}",
                    resize.width, resize.height
                )));
            }
        }

        if let Some(crop) = request.crop {
            if crop.width == 0 || crop.height == 0 {
                return Err(TransformError::Validation(format!(
                    "crop width and height must be positive, got {}x{}",
                    crop.width, crop.height
                )));
            }
        }

        let rotate = request.rotate.map(Rotation::from_degrees).transpose()?;

        let format = match request.format.as_deref() {
            Some(name) => name.parse::<OutputFormat>()?,
            None => OutputFormat::DEFAULT,
        };

        let filters = request.filters.unwrap_or_default();

        Ok(TransformPlan {
            resize: request.resize,
            crop: request.crop,
            rotate,
            grayscale: filters.grayscale,
            sepia: filters.sepia,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::{CropOptions, FilterOptions, ResizeOptions};

    fn validator() -> RequestValidator {
        RequestValidator::new(LimitsConfig::default())
    }

    #[test]
    fn test_empty_request_is_valid_passthrough() {
        let plan = validator()
            .validate(&TransformationRequest::default())
            .unwrap();
        assert_eq!(plan, TransformPlan::default());
        assert_eq!(plan.format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_full_request_builds_plan() {
        let request = TransformationRequest {
            resize: Some(ResizeOptions {
                width: 200,
                height: 100,
            }),
            crop: Some(CropOptions {
                width: 50,
                height: 50,
                x: 10,
                y: 10,
            }),
            rotate: Some(-90.0),
            filters: Some(FilterOptions {
                grayscale: true,
                sepia: true,
            }),
            format: Some("PNG".to_string()),
        };
        let plan = validator().validate(&request).unwrap();
        assert_eq!(plan.rotate.map(Rotation::degrees), Some(270));
        assert!(plan.grayscale && plan.sepia);
        assert_eq!(plan.format, OutputFormat::Png);
    }

    #[test]
    fn test_zero_resize_rejected() {
        let request = TransformationRequest {
            resize: Some(ResizeOptions {
                width: 0,
                height: 10,
            }),
            ..Default::default()
        };
        assert!(matches!(
            validator().validate(&request),
            Err(TransformError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_resize_rejected() {
        let validator = RequestValidator::new(LimitsConfig {
            max_image_dimension: 500,
            ..Default::default()
        });
        let request = TransformationRequest {
            resize: Some(ResizeOptions {
                width: 501,
                height: 10,
            }),
            ..Default::default()
        };
        let err = validator.validate(&request).unwrap_err();
        assert!(err.to_string().contains("maximum dimension 500"));
    }

    #[test]
    fn test_zero_crop_rejected() {
        let request = TransformationRequest {
            crop: Some(CropOptions {
                width: 10,
                height: 0,
                x: 0,
                y: 0,
            }),
            ..Default::default()
        };
        assert!(matches!(
            validator().validate(&request),
            Err(TransformError::Validation(_))
        ));
    }

    #[test]
    fn test_huge_crop_passes_validation() {
        // Bounds depend on the decoded image and are checked by the pipeline.
        let request = TransformationRequest {
            crop: Some(CropOptions {
                width: u32::MAX,
                height: u32::MAX,
                x: u32::MAX,
                y: 0,
            }),
            ..Default::default()
        };
        assert!(validator().validate(&request).is_ok());
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let request = TransformationRequest {
            format: Some("heic".to_string()),
            ..Default::default()
        };
        match validator().validate(&request) {
            Err(TransformError::UnsupportedFormat { format }) => assert_eq!(format, "heic"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_rotation_rejected() {
        let request = TransformationRequest {
            rotate: Some(45.5),
            ..Default::default()
        };
        assert!(matches!(
            validator().validate(&request),
            Err(TransformError::InvalidRotationAngle { .. })
        ));
    }
}
