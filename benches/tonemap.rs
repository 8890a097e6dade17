use std::hint::black_box;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hdr_fusion_rs::image_pipeline::{
    CameraResponse, DebevecMerger, ExposureSet, ImageWriter, RadianceFormat, RadianceMap,
    StandardImageWriter, TiffCompression, TonemapOperator, Tonemapper,
};
use image::{Rgb, RgbImage};

fn generate_radiance_map(width: u32, height: u32) -> RadianceMap {
    let span = (width + height - 2) as f32;
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let e = 10f32.powf(-2.0 + 4.0 * (x + y) as f32 / span);
            data.extend([e, 0.8 * e, 0.6 * e]);
        }
    }
    RadianceMap::new(width, height, data).unwrap()
}

fn generate_bracket(width: u32, height: u32) -> ExposureSet {
    let times = vec![1.0 / 30.0, 0.25, 2.5, 15.0];
    let images = times
        .iter()
        .map(|&t| {
            RgbImage::from_fn(width, height, |x, y| {
                let e = 10f32.powf(-2.0 + 4.0 * (x + y) as f32 / (width + height - 2) as f32);
                let v = (255.0 * (e * t).min(1.0)).round() as u8;
                Rgb([v, v, v])
            })
        })
        .collect();
    ExposureSet::new(images, times).unwrap()
}

fn benchmark_tonemap_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tonemap_by_size");
    let tonemapper = Tonemapper::default();

    for (width, height, label) in [(100, 100, "100x100"), (500, 500, "500x500")] {
        let map = generate_radiance_map(width, height);
        for operator in TonemapOperator::ALL {
            group.bench_with_input(
                BenchmarkId::new(operator.as_str(), label),
                &map,
                |b, map| b.iter(|| tonemapper.process(black_box(map), operator)),
            );
        }
    }

    group.finish();
}

fn benchmark_merge(c: &mut Criterion) {
    let set = generate_bracket(500, 500);
    let response = CameraResponse::linear();

    c.bench_function("merge_500x500_4_images", |b| {
        b.iter(|| DebevecMerger::new().process(black_box(&set), &response))
    });
}

fn benchmark_radiance_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("radiance_formats");
    let map = generate_radiance_map(500, 500);

    let writers = [
        (RadianceFormat::Hdr, TiffCompression::None, "hdr"),
        (RadianceFormat::Tiff, TiffCompression::None, "tiff_none"),
        (RadianceFormat::Tiff, TiffCompression::Lzw, "tiff_lzw"),
        (RadianceFormat::Tiff, TiffCompression::DeflateFast, "tiff_deflate_fast"),
    ];

    for (format, compression, label) in writers {
        let writer = StandardImageWriter::new(95, compression);
        group.bench_with_input(BenchmarkId::from_parameter(label), &map, |b, map| {
            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                writer.write_radiance(black_box(map), format, &mut output).unwrap();
                black_box(output.into_inner())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_tonemap_sizes,
    benchmark_merge,
    benchmark_radiance_formats
);
criterion_main!(benches);
