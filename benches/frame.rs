//! Benchmarks for the CPU side of a frame.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use particle_field::connections::for_each_connection;
use particle_field::prelude::*;

fn running_field(count: u32) -> (ParticleField<RecordingSurface>, ManualScheduler) {
    let config = FieldConfig::default()
        .with_particle_count(count)
        .with_seed(42);
    let mut scheduler = ManualScheduler::new();
    let mut field = ParticleField::new(RecordingSurface::new(1280, 720), config)
        .expect("default config is valid");
    field.initialize(&mut scheduler).expect("surface has area");
    (field, scheduler)
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for count in [80u32, 400] {
        group.bench_with_input(BenchmarkId::new("recording", count), &count, |b, &count| {
            let (mut field, mut scheduler) = running_field(count);
            b.iter(|| {
                scheduler.fire();
                black_box(field.frame(&mut scheduler))
            })
        });
    }

    group.bench_function("raster_80", |b| {
        let config = FieldConfig::default().with_seed(42);
        let mut scheduler = ManualScheduler::new();
        let mut field = ParticleField::new(RasterSurface::new(640, 360), config)
            .expect("default config is valid");
        field.initialize(&mut scheduler).expect("surface has area");
        b.iter(|| {
            scheduler.fire();
            black_box(field.frame(&mut scheduler))
        })
    });

    group.finish();
}

fn bench_connections(c: &mut Criterion) {
    let mut group = c.benchmark_group("connections");

    for count in [80u32, 400, 1000] {
        let (field, _) = running_field(count);
        group.bench_with_input(BenchmarkId::new("scan", count), field.particles(), |b, particles| {
            b.iter(|| black_box(for_each_connection(particles, 150.0, |_, _, _| {})))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_connections);
criterion_main!(benches);
