//! Encoding the final buffer into the requested container.

use image::codecs::avif::AvifEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, Frame, GenericImageView, ImageFormat, RgbImage, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;

use crate::config::OutputConfig;
use crate::error::{ConfigError, TransformError};
use crate::types::TransformedImage;

use super::request::OutputFormat;

/// Serializes pixel buffers into output containers.
#[derive(Debug, Clone)]
pub struct ImageEncoder {
    jpeg_quality: u8,
    avif_quality: u8,
    avif_speed: u8,
    background: [u8; 3],
}

impl ImageEncoder {
    /// Create an encoder from output settings.
    pub fn new(config: &OutputConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            jpeg_quality: config.jpeg_quality,
            avif_quality: config.avif_quality,
            avif_speed: config.avif_speed,
            background: config.background_rgb()?,
        })
    }

    /// Encode `image` as `format`.
    ///
    /// Formats without alpha get transparent pixels composited over the
    /// configured background; this never fails on its own.
    pub fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> Result<TransformedImage, TransformError> {
        let prepared = self.prepare(image, format);
        let (width, height) = prepared.dimensions();
        let mut buf = Cursor::new(Vec::new());

        let result = match format {
            OutputFormat::Jpeg => prepared
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality)),
            OutputFormat::Png => prepared.write_to(&mut buf, ImageFormat::Png),
            // The image crate only ships a lossless WebP encoder.
            OutputFormat::WebP => prepared.write_with_encoder(WebPEncoder::new_lossless(&mut buf)),
            OutputFormat::Tiff => prepared.write_to(&mut buf, ImageFormat::Tiff),
            OutputFormat::Avif => prepared.write_with_encoder(AvifEncoder::new_with_speed_quality(
                &mut buf,
                self.avif_speed,
                self.avif_quality,
            )),
            OutputFormat::Gif => {
                // The trailer is written when the encoder drops at the end of this block.
                let mut encoder = GifEncoder::new(&mut buf);
                encoder.encode_frame(Frame::new(prepared.to_rgba8()))
            }
        };
        result.map_err(|e| TransformError::Encode {
            format: format.to_string(),
            message: e.to_string(),
        })?;

        Ok(TransformedImage {
            bytes: buf.into_inner(),
            format,
            content_type: format.content_type(),
            width,
            height,
        })
    }

    /// Convert to a pixel layout the target encoder accepts.
    fn prepare<'a>(&self, image: &'a DynamicImage, format: OutputFormat) -> Cow<'a, DynamicImage> {
        let has_alpha = image.color().has_alpha();
        let color = image.color();

        if has_alpha && !format.supports_alpha() {
            return Cow::Owned(DynamicImage::ImageRgb8(flatten(
                &image.to_rgba8(),
                self.background,
            )));
        }

        match format {
            OutputFormat::Jpeg => match color {
                ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
                ColorType::L16 => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
                _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
            },
            OutputFormat::Png => match color {
                ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
                    Cow::Borrowed(image)
                }
                _ => Cow::Owned(to_rgb_family(image, has_alpha)),
            },
            OutputFormat::Tiff => match color {
                ColorType::L8 | ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(image),
                _ => Cow::Owned(to_rgb_family(image, has_alpha)),
            },
            OutputFormat::WebP | OutputFormat::Avif => match color {
                ColorType::Rgb8 | ColorType::Rgba8 => Cow::Borrowed(image),
                _ => Cow::Owned(to_rgb_family(image, has_alpha)),
            },
            OutputFormat::Gif => Cow::Borrowed(image),
        }
    }
}

fn to_rgb_family(image: &DynamicImage, has_alpha: bool) -> DynamicImage {
    if has_alpha {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

/// Composite RGBA over an opaque background color.
fn flatten(src: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let a = u16::from(a);
        let blend = |c: u8, bg: u8| ((u16::from(c) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8;
        image::Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{decode, gradient_rgb, half_transparent};

    fn encoder() -> ImageEncoder {
        ImageEncoder::new(&OutputConfig::default()).unwrap()
    }

    #[test]
    fn test_encode_jpeg() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::Jpeg).unwrap();
        assert_eq!(&out.bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(out.content_type, "image/jpeg");
    }

    #[test]
    fn test_encode_png() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::Png).unwrap();
        assert_eq!(
            &out.bytes[0..8],
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        );
    }

    #[test]
    fn test_encode_webp() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::WebP).unwrap();
        assert_eq!(&out.bytes[0..4], b"RIFF");
        assert_eq!(&out.bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_tiff() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::Tiff).unwrap();
        assert!(&out.bytes[0..2] == b"II" || &out.bytes[0..2] == b"MM");
    }

    #[test]
    fn test_encode_gif() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::Gif).unwrap();
        assert_eq!(&out.bytes[0..4], b"GIF8");
        assert_eq!(out.bytes.last(), Some(&0x3B));
    }

    #[test]
    fn test_encode_avif() {
        let out = encoder().encode(&gradient_rgb(10, 10), OutputFormat::Avif).unwrap();
        assert_eq!(&out.bytes[4..8], b"ftyp");
        assert_eq!(out.content_type, "image/avif");
    }

    #[test]
    fn test_lossless_formats_keep_dimensions() {
        let img = gradient_rgb(21, 13);
        for format in [
            OutputFormat::Png,
            OutputFormat::WebP,
            OutputFormat::Tiff,
            OutputFormat::Gif,
            OutputFormat::Jpeg,
        ] {
            let out = encoder().encode(&img, format).unwrap();
            assert_eq!((out.width, out.height), (21, 13));
            assert_eq!(decode(&out.bytes).dimensions(), (21, 13), "{format}");
        }
    }

    #[test]
    fn test_jpeg_flattens_alpha_onto_background() {
        let out = encoder()
            .encode(&half_transparent(64, 16), OutputFormat::Jpeg)
            .unwrap();
        let decoded = decode(&out.bytes).to_rgb8();
        let left = decoded.get_pixel(4, 8).0;
        let right = decoded.get_pixel(60, 8).0;
        assert!(left.iter().all(|&c| c > 235), "left should be white, got {left:?}");
        assert!(right[0] > 200 && right[1] < 60 && right[2] < 60, "right should be red, got {right:?}");
    }

    #[test]
    fn test_flatten_uses_configured_background() {
        let encoder = ImageEncoder::new(&OutputConfig {
            background: "#000000".to_string(),
            ..Default::default()
        })
        .unwrap();
        let flat = flatten(&half_transparent(4, 1).to_rgba8(), encoder.background);
        assert_eq!(flat.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(flat.get_pixel(3, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_only_jpeg_drops_alpha() {
        let img = half_transparent(8, 2);
        for format in OutputFormat::ALL {
            let prepared = encoder().prepare(&img, format);
            assert_eq!(
                prepared.color().has_alpha(),
                format.supports_alpha(),
                "{format}"
            );
        }
    }

    #[test]
    fn test_png_keeps_alpha() {
        let out = encoder()
            .encode(&half_transparent(8, 2), OutputFormat::Png)
            .unwrap();
        let decoded = decode(&out.bytes).to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(decoded.get_pixel(7, 0)[3], 255);
    }

    #[test]
    fn test_grayscale_buffer_encodes_everywhere() {
        let gray = gradient_rgb(12, 12).grayscale();
        for format in OutputFormat::ALL {
            assert!(encoder().encode(&gray, format).is_ok(), "{format}");
        }
    }

    #[test]
    fn test_gif_dimension_limit_is_encode_error() {
        let wide = DynamicImage::new_rgb8(70_000, 1);
        match encoder().encode(&wide, OutputFormat::Gif) {
            Err(TransformError::Encode { format, .. }) => assert_eq!(format, "gif"),
            other => panic!("expected Encode error, got {:?}", other.map(|o| o.bytes.len())),
        }
    }

    #[test]
    fn test_invalid_background_rejected() {
        let config = OutputConfig {
            background: "#12".to_string(),
            ..Default::default()
        };
        assert!(ImageEncoder::new(&config).is_err());
    }
}
