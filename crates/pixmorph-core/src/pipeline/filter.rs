//! Color filter stages: grayscale and sepia.

use image::DynamicImage;

/// Parameters of the sepia transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SepiaParams {
    /// Multiplier applied to HSL saturation
    pub saturation: f32,
    /// Multiplier applied to HSL lightness
    pub brightness: f32,
    /// Color whose hue every pixel takes on
    pub tint: [u8; 3],
}

impl SepiaParams {
    /// The sepia look served by the API. Not tunable per request.
    pub const STANDARD: SepiaParams = SepiaParams {
        saturation: 0.3,
        brightness: 1.05,
        tint: [0x70, 0x42, 0x14],
    };
}

/// Drop chrominance, keeping Rec. 709 luminance. Alpha is kept.
pub fn grayscale(image: DynamicImage) -> DynamicImage {
    image.grayscale()
}

/// Desaturate, brighten and tint toward `params.tint`.
///
/// Works per pixel in HSL: saturation and lightness are scaled, hue is
/// replaced by the tint's hue. The tint brings no saturation of its own, so a
/// pixel that is already neutral stays neutral and only gets brighter. Alpha
/// is kept.
pub fn sepia(image: DynamicImage, params: &SepiaParams) -> DynamicImage {
    let (tint_hue, _, _) = rgb_to_hsl(params.tint);

    if image.color().has_alpha() {
        let mut buf = image.into_rgba8();
        for pixel in buf.pixels_mut() {
            let [r, g, b] = sepia_pixel([pixel[0], pixel[1], pixel[2]], tint_hue, params);
            pixel.0 = [r, g, b, pixel[3]];
        }
        DynamicImage::ImageRgba8(buf)
    } else {
        let mut buf = image.into_rgb8();
        for pixel in buf.pixels_mut() {
            pixel.0 = sepia_pixel(pixel.0, tint_hue, params);
        }
        DynamicImage::ImageRgb8(buf)
    }
}

fn sepia_pixel(rgb: [u8; 3], tint_hue: f32, params: &SepiaParams) -> [u8; 3] {
    let (_, saturation, lightness) = rgb_to_hsl(rgb);
    let saturation = (saturation * params.saturation).clamp(0.0, 1.0);
    let lightness = (lightness * params.brightness).clamp(0.0, 1.0);
    hsl_to_rgb(tint_hue, saturation, lightness)
}

/// RGB to (hue degrees, saturation, lightness).
fn rgb_to_hsl([r, g, b]: [u8; 3]) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, lightness);
    }

    let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
    let hue = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    (hue, saturation.clamp(0.0, 1.0), lightness)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let to_byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    if saturation == 0.0 {
        let v = to_byte(lightness);
        return [v, v, v];
    }

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    [to_byte(r + m), to_byte(g + m), to_byte(b + m)]
}
