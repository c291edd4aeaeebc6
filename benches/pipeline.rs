use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use uvstrip_dosimetry::detection::StripLocator;
use uvstrip_dosimetry::preprocess::ImagePreprocessor;
use uvstrip_dosimetry::StripAnalyzer;

fn strip_photo(width: u32, height: u32) -> DynamicImage {
    let (rw, rh) = (width * 300 / 1024, height * 80 / 768);
    let (rx, ry) = ((width - rw) / 2, (height - rh) / 2);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if x >= rx && x < rx + rw && y >= ry && y < ry + rh {
            Rgb([140, 100, 80])
        } else {
            Rgb([250, 245, 240])
        }
    }))
}

fn benchmark_pipeline(c: &mut Criterion) {
    let analyzer = StripAnalyzer::default();
    let photo = strip_photo(1024, 768);
    let large = strip_photo(3000, 2250);

    c.bench_function("analyze_1024x768", |b| {
        b.iter(|| analyzer.analyze(black_box(&photo), None))
    });

    c.bench_function("analyze_3000x2250", |b| {
        b.iter(|| analyzer.analyze(black_box(&large), None))
    });

    let prepared = ImagePreprocessor::default().preprocess(&photo);
    let locator = StripLocator::default();
    c.bench_function("locate_1024x768", |b| {
        b.iter(|| locator.locate(black_box(&prepared)))
    });
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
