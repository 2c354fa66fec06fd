//! Geometric stages: resize, crop and rotate.
//!
//! Each stage takes the buffer by value and returns the next one.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::error::TransformError;

use super::request::{CropOptions, ResizeOptions, Rotation};

/// Scale to exactly the requested size. Aspect ratio is not preserved.
pub fn resize(image: DynamicImage, target: ResizeOptions) -> DynamicImage {
    if image.dimensions() == (target.width, target.height) {
        return image;
    }
    image.resize_exact(target.width, target.height, FilterType::Lanczos3)
}

/// Extract a rectangle from the current buffer.
pub fn crop(image: DynamicImage, rect: CropOptions) -> Result<DynamicImage, TransformError> {
    let (image_width, image_height) = image.dimensions();
    let fits_x = rect
        .x
        .checked_add(rect.width)
        .is_some_and(|right| right <= image_width);
    let fits_y = rect
        .y
        .checked_add(rect.height)
        .is_some_and(|bottom| bottom <= image_height);

    if !fits_x || !fits_y {
        return Err(TransformError::CropOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            image_width,
            image_height,
        });
    }

    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

/// Rotate clockwise by a normalized angle.
///
/// Quarter turns are exact pixel transposes. Any other angle renders onto a
/// canvas large enough to hold the whole rotated image; the corners that
/// become exposed are fully transparent and the buffer becomes RGBA8.
///
/// The expanded canvas must stay within `max_dim` on both sides, otherwise
/// [`TransformError::ImageTooLarge`] is returned before anything is allocated.
pub fn rotate(
    image: DynamicImage,
    rotation: Rotation,
    max_dim: u32,
) -> Result<DynamicImage, TransformError> {
    let rotated = match rotation.degrees() {
        0 => image,
        90 => image.rotate90(),
        180 => image.rotate180(),
        270 => image.rotate270(),
        degrees => {
            let degrees = f64::from(degrees);
            let (width, height) = rotated_bounds(image.width(), image.height(), degrees);
            if width > max_dim || height > max_dim {
                return Err(TransformError::ImageTooLarge {
                    width,
                    height,
                    max_dim,
                });
            }
            DynamicImage::ImageRgba8(rotate_free(&image.to_rgba8(), degrees))
        }
    };
    Ok(rotated)
}

/// Output canvas size for a rotation by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (f64::from(width), f64::from(height));
    // Epsilon keeps exact sizes like 100.0000001 from growing a pixel.
    let out_w = (w * cos.abs() + h * sin.abs() - 1e-6).ceil().max(1.0);
    let out_h = (w * sin.abs() + h * cos.abs() - 1e-6).ceil().max(1.0);
    (out_w as u32, out_h as u32)
}

fn rotate_free(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = src.dimensions();
    let (out_w, out_h) = rotated_bounds(width, height, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let src_cx = f64::from(width) / 2.0;
    let src_cy = f64::from(height) / 2.0;
    let dst_cx = f64::from(out_w) / 2.0;
    let dst_cy = f64::from(out_h) / 2.0;

    RgbaImage::from_fn(out_w, out_h, |x, y| {
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        // Inverse mapping: undo a clockwise turn in y-down coordinates.
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;
        sample_bilinear(src, sx - 0.5, sy - 0.5)
    })
}

/// Bilinear sample with premultiplied alpha. Outside the source is transparent.
fn sample_bilinear(src: &RgbaImage, fx: f64, fy: f64) -> Rgba<u8> {
    let (width, height) = src.dimensions();
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let taps = [
        (x0, y0, (1.0 - tx) * (1.0 - ty)),
        (x0 + 1.0, y0, tx * (1.0 - ty)),
        (x0, y0 + 1.0, (1.0 - tx) * ty),
        (x0 + 1.0, y0 + 1.0, tx * ty),
    ];

    let mut acc = [0.0f64; 4];
    for (px, py, weight) in taps {
        if weight <= 0.0
            || px < 0.0
            || py < 0.0
            || px >= f64::from(width)
            || py >= f64::from(height)
        {
            continue;
        }
        let p = src.get_pixel(px as u32, py as u32).0;
        let alpha = f64::from(p[3]) / 255.0 * weight;
        acc[0] += f64::from(p[0]) * alpha;
        acc[1] += f64::from(p[1]) * alpha;
        acc[2] += f64::from(p[2]) * alpha;
        acc[3] += alpha;
    }

    if acc[3] <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |v: f64| (v / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
