use colorhist::worker_pool::{build_pool, default_thread_count};
use colorhist::{quantize, Histogram, HistogramEngine, Pixel, PixelBuffer, Strategy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn quantized_image(width: usize, height: usize, divisions: usize) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let pixels = (0..width * height)
        .map(|_| Pixel::new(rng.gen(), rng.gen(), rng.gen()))
        .collect();
    let mut buffer = PixelBuffer::new(width, height, pixels).unwrap();
    quantize(&mut buffer, divisions, &build_pool(default_thread_count()).unwrap()).unwrap();
    buffer
}

fn bench_strategies(c: &mut Criterion) {
    let buffer = quantized_image(320, 240, 8);
    let pool = build_pool(default_thread_count()).unwrap();
    let mut group = c.benchmark_group("histogram_320x240_d8");

    for strategy in [Strategy::BinParallel, Strategy::SinglePass] {
        let engine = HistogramEngine::new(pool.clone(), 8)
            .unwrap()
            .with_strategy(strategy);
        let mut hist = Histogram::new(8).unwrap();
        group.bench_function(BenchmarkId::from_parameter(strategy), |b| {
            b.iter(|| engine.compute(black_box(&buffer), &mut hist).unwrap())
        });
    }
    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let buffer = quantized_image(160, 120, 8);
    let mut group = c.benchmark_group("bin_parallel_threads");
    group.sample_size(20);

    let max_threads = default_thread_count();
    let mut threads = 1;
    while threads <= max_threads {
        let engine = HistogramEngine::new(build_pool(threads).unwrap(), 8).unwrap();
        let mut hist = Histogram::new(8).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, _| {
            b.iter(|| engine.compute(black_box(&buffer), &mut hist).unwrap())
        });
        threads *= 2;
    }
    group.finish();
}

fn bench_quantize(c: &mut Criterion) {
    let pool = build_pool(default_thread_count()).unwrap();
    let source = PixelBuffer::filled(1920, 1080, Pixel::new(200, 150, 100)).unwrap();

    c.bench_function("quantize_1920x1080", |b| {
        b.iter_batched(
            || source.clone(),
            |mut buffer| quantize(&mut buffer, 8, &pool).unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_strategies, bench_thread_scaling, bench_quantize);
criterion_main!(benches);
