//! Shared test utilities: synthetic images and in-memory encoding.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// A colorful RGB image where every pixel differs from its neighbors.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 7 % 256) as u8;
        Rgb([r, g, b])
    });
    DynamicImage::ImageRgb8(img)
}

/// An RGBA image with a fully transparent left half and opaque red right half.
pub fn half_transparent(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 0, 0, 255])
        }
    });
    DynamicImage::ImageRgba8(img)
}

/// Encode an image with the image crate's default encoder for `format`.
pub fn encode_as(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// PNG bytes of a gradient image.
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    encode_as(&gradient_rgb(width, height), ImageFormat::Png)
}

/// Decode bytes produced by the encoder under test.
pub fn decode(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).unwrap()
}
