//! Stage composition.
//!
//! ```text
//! resize → crop → rotate → grayscale → sepia
//! ```
//!
//! Each stage runs only when the plan asks for it. Crop coordinates refer to
//! the buffer as it leaves resize. The first failing stage aborts the whole
//! call. `max_dim` bounds the canvas a free rotation may grow to.

use image::{DynamicImage, GenericImageView};

use crate::error::TransformError;

use super::filter::{self, SepiaParams};
use super::geometry;
use super::request::TransformPlan;

/// Apply every stage in `plan` to `image`, in fixed order.
pub fn apply(
    image: DynamicImage,
    plan: &TransformPlan,
    max_dim: u32,
) -> Result<DynamicImage, TransformError> {
    let mut image = image;

    if let Some(target) = plan.resize {
        image = geometry::resize(image, target);
        tracing::trace!("  Resize: {:?}", image.dimensions());
    }

    if let Some(rect) = plan.crop {
        image = geometry::crop(image, rect)?;
        tracing::trace!("  Crop: {:?}", image.dimensions());
    }

    if let Some(rotation) = plan.rotate {
        image = geometry::rotate(image, rotation, max_dim)?;
        tracing::trace!("  Rotate {}: {:?}", rotation.degrees(), image.dimensions());
    }

    if plan.grayscale {
        image = filter::grayscale(image);
        tracing::trace!("  Grayscale");
    }

    if plan.sepia {
        image = filter::sepia(image, &SepiaParams::STANDARD);
        tracing::trace!("  Sepia");
    }

    Ok(image)
}
