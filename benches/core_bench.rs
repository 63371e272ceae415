use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use std::hint::black_box;
use vtt_stage_editor::core::{
    color_of, snap, sort_regions, GridConfig, GridType, PoleIndex, Pole, Region, RegionType,
    Stage, Wall, WallVisibility,
};

fn build_query_points(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let x = (i % 1000) as f32 * 3.7 + 0.37;
            let y = ((i * 7) % 1000) as f32 * 2.9 + 0.63;
            Vec2::new(x, y)
        })
        .collect()
}

fn bench_snap(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_snap");
    let points = build_query_points(4096);

    for grid_type in [GridType::Square, GridType::HexV, GridType::HexH, GridType::Isometric] {
        let config = GridConfig::new(grid_type, 50.0).with_offset(12.0, 7.0);
        group.bench_with_input(
            BenchmarkId::new("snap_batch", format!("{grid_type:?}")),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut acc = Vec2::ZERO;
                    for point in &points {
                        acc += snap(black_box(*point), config);
                    }
                    black_box(acc)
                })
            },
        );
    }

    group.finish();
}

fn build_regions(count: u32) -> Vec<Region> {
    (0..count)
        .map(|index| {
            let region_type = RegionType::ALL[(index % 3) as usize];
            let value = match region_type {
                RegionType::Elevation => (index % 40) as i32 - 20,
                RegionType::Terrain => (index % 3) as i32,
                RegionType::Illumination => (index % 4) as i32 - 2,
            };
            let origin = Vec2::new((index % 50) as f32 * 20.0, (index / 50) as f32 * 20.0);
            Region {
                id: None,
                index: count - index,
                name: format!("Region {index}"),
                region_type,
                vertices: vec![
                    origin,
                    origin + Vec2::new(40.0, 0.0),
                    origin + Vec2::new(40.0, 40.0),
                ],
                value,
                color: None,
            }
        })
        .collect()
}

fn bench_region_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_resolution");

    for &count in &[100u32, 1_000u32] {
        let regions = build_regions(count);
        group.bench_with_input(BenchmarkId::new("sort_and_color", count), &regions, |b, all| {
            b.iter(|| {
                let mut visible = 0usize;
                for region in sort_regions(black_box(all)) {
                    if !color_of(region, all).is_transparent() {
                        visible += 1;
                    }
                }
                black_box(visible)
            })
        });
    }

    group.finish();
}

fn build_stage_with_walls(wall_count: u32) -> Stage {
    let mut stage = Stage::new("bench");
    for index in 0..wall_count {
        let x = (index % 100) as f32 * 50.0;
        let y = (index / 100) as f32 * 50.0;
        stage.walls.insert(
            index,
            Wall {
                index,
                name: format!("Wall {index}"),
                poles: vec![Pole::new(x, y, 10.0), Pole::new(x + 40.0, y, 10.0)],
                visibility: WallVisibility::Normal,
                is_closed: false,
                material: None,
                color: None,
                segments: Vec::new(),
            },
        );
    }
    stage
}

fn bench_pole_picking(c: &mut Criterion) {
    let stage = build_stage_with_walls(10_000);
    let index = PoleIndex::from_stage(&stage);
    let points = build_query_points(1024);

    c.bench_function("pole_pick_batch_10k_walls", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for point in &points {
                if index.pick(black_box(*point), 12.0).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_snap, bench_region_resolution, bench_pole_picking);
criterion_main!(benches);
