use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use std::hint::black_box;
use vtt_stage_editor::core::{trace_region_boundary, Barrier, FogMask, FogMode, LineSegment};

fn circle_polygon(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Raster aus Raumwänden mit Türlücken, damit die Füllung Barrieren prüfen muss.
fn room_barriers(extent: f32, room: f32) -> Vec<LineSegment> {
    let mut lines = Vec::new();
    let mut pos = room;
    while pos < extent {
        let mut start = 0.0;
        while start < extent {
            let end = (start + room - 20.0).min(extent);
            lines.push(LineSegment::new(Vec2::new(pos, start), Vec2::new(pos, end)));
            lines.push(LineSegment::new(Vec2::new(start, pos), Vec2::new(end, pos)));
            start += room;
        }
        pos += room;
    }
    lines
}

fn bench_apply_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("fog_apply_polygon");

    for &size in &[1_000.0f32, 4_000.0f32] {
        let polygon = circle_polygon(Vec2::splat(size * 0.5), size * 0.4, 64);
        group.bench_with_input(BenchmarkId::new("circle_64", size as u32), &size, |b, &size| {
            b.iter_batched(
                || FogMask::covering(Vec2::ZERO, Vec2::splat(size), 10.0).expect("Maske"),
                |mut mask| black_box(mask.apply_polygon(black_box(&polygon), FogMode::Add)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_bucket_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fog_bucket_fill");
    group.sample_size(20);

    for &size in &[1_000.0f32, 2_000.0f32] {
        let open = Vec::new();
        let rooms = room_barriers(size, 200.0);

        group.bench_with_input(BenchmarkId::new("unbounded", size as u32), &size, |b, &size| {
            b.iter_batched(
                || FogMask::covering(Vec2::ZERO, Vec2::splat(size), 10.0).expect("Maske"),
                |mut mask| black_box(mask.bucket_fill(Vec2::splat(5.0), FogMode::Add, &open)),
                criterion::BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("rooms", size as u32), &size, |b, &size| {
            b.iter_batched(
                || FogMask::covering(Vec2::ZERO, Vec2::splat(size), 10.0).expect("Maske"),
                |mut mask| black_box(mask.bucket_fill(Vec2::splat(5.0), FogMode::Add, &rooms)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_region_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_fill");
    group.sample_size(20);

    for &size in &[1_000.0f32, 2_000.0f32] {
        let barriers: Vec<Barrier> = room_barriers(size, 200.0)
            .into_iter()
            .enumerate()
            .map(|(i, line)| Barrier {
                wall_index: i as u32,
                line,
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("rooms", size as u32), &size, |b, &size| {
            b.iter(|| {
                black_box(trace_region_boundary(
                    black_box(Vec2::splat(100.0)),
                    &barriers,
                    Vec2::splat(size),
                    5.0,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_apply_polygon, bench_bucket_fill, bench_region_fill);
criterion_main!(benches);
