//! Benchmarks for the Pixmorph transformation pipeline.
//!
//! Run with: cargo bench -p pixmorph-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pixmorph_core::config::{LimitsConfig, OutputConfig};
use pixmorph_core::pipeline::{
    filter, geometry, ImageDecoder, ImageEncoder, OutputFormat, ResizeOptions, Rotation,
    SepiaParams,
};
use std::io::Cursor;

fn photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

fn benchmark_decode(c: &mut Criterion) {
    let mut buf = Cursor::new(Vec::new());
    photo(1920, 1080).write_to(&mut buf, ImageFormat::Png).unwrap();
    let bytes = buf.into_inner();
    let decoder = ImageDecoder::new(LimitsConfig::default());

    c.bench_function("decode_png_1080p", |b| {
        b.iter(|| {
            let _ = decoder.decode_bytes(black_box(&bytes));
        })
    });
}

fn benchmark_resize(c: &mut Criterion) {
    let img = photo(1920, 1080);
    let target = ResizeOptions {
        width: 640,
        height: 360,
    };

    c.bench_function("resize_lanczos3_1080p_to_360p", |b| {
        b.iter(|| geometry::resize(black_box(img.clone()), target))
    });
}

fn benchmark_rotate(c: &mut Criterion) {
    let img = photo(640, 480);
    let quarter = Rotation::from_degrees(90.0).unwrap();
    let free = Rotation::from_degrees(30.0).unwrap();

    c.bench_function("rotate_90", |b| {
        b.iter(|| geometry::rotate(black_box(img.clone()), quarter, 10_000))
    });
    c.bench_function("rotate_30_bilinear", |b| {
        b.iter(|| geometry::rotate(black_box(img.clone()), free, 10_000))
    });
}

fn benchmark_sepia(c: &mut Criterion) {
    let img = photo(640, 480);

    c.bench_function("sepia_640x480", |b| {
        b.iter(|| filter::sepia(black_box(img.clone()), &SepiaParams::STANDARD))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let img = photo(640, 480);
    let encoder = ImageEncoder::new(&OutputConfig::default()).unwrap();

    for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
        c.bench_function(&format!("encode_{format}_640x480"), |b| {
            b.iter(|| {
                let _ = encoder.encode(black_box(&img), format);
            })
        });
    }
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_resize,
    benchmark_rotate,
    benchmark_sepia,
    benchmark_encode,
);
criterion_main!(benches);
