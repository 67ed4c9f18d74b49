// SPDX-License-Identifier: MIT
//
// Criterion benchmarks for the linework-imaging crate. Covers the outline
// extraction pipeline on a small synthetic scene and the bilateral filter,
// which dominates the adaptive strategy's runtime.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use linework_core::types::{OutlineParams, OutlineStrategy};
use linework_core::EngineConfig;
use linework_imaging::filter::bilateral_filter;
use linework_imaging::OutlineExtractor;

/// A 100x100 grayscale scene with a bright rectangle on a dark background,
/// the same pattern the unit tests use.
fn synthetic_scene() -> DynamicImage {
    let mut img = GrayImage::from_pixel(100, 100, Luma([30u8]));
    for y in 15..85 {
        for x in 15..85 {
            img.put_pixel(x, y, Luma([240u8]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

fn bench_outline_fixed(c: &mut Criterion) {
    let scene = synthetic_scene();
    let mut params = OutlineParams::from_config(&EngineConfig::default());
    params.thickness = 3;

    c.bench_function("outline fixed (100x100, thickness 3)", |b| {
        b.iter(|| {
            let extractor = OutlineExtractor::new(params);
            black_box(extractor.extract(black_box(&scene)));
        });
    });
}

fn bench_outline_adaptive(c: &mut Criterion) {
    let scene = synthetic_scene();
    let mut params = OutlineParams::from_config(&EngineConfig::default());
    params.strategy = OutlineStrategy::Adaptive;

    c.bench_function("outline adaptive (100x100)", |b| {
        b.iter(|| {
            let extractor = OutlineExtractor::new(params);
            black_box(extractor.extract(black_box(&scene)));
        });
    });
}

fn bench_bilateral_filter(c: &mut Criterion) {
    let gray = synthetic_scene().to_luma8();

    c.bench_function("bilateral filter (100x100, d=9)", |b| {
        b.iter(|| {
            black_box(bilateral_filter(black_box(&gray), 9, 75.0, 75.0));
        });
    });
}

criterion_group!(
    benches,
    bench_outline_fixed,
    bench_outline_adaptive,
    bench_bilateral_filter
);
criterion_main!(benches);
