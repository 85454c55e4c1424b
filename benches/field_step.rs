//! Benchmarks for the per-frame CPU work: field step and edge recompute.
//!
//! Run with: `cargo bench`

use coreflow_fx::connections::{find_edges, ConnectionGraph};
use coreflow_fx::field::FieldConfig;
use coreflow_fx::spatial::{SpatialConfig, SpatialStrategy};
use coreflow_fx::{ConnectionConfig, Distribution, ParticleField, Scene, SpawnContext, Time, Vec2, Vec3};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SIZES: [usize; 4] = [100, 300, 1000, 2000];

/// A field with roughly half of its particles engaged.
fn warmed_field(capacity: usize, spatial: SpatialStrategy) -> ParticleField {
    let config = FieldConfig {
        activation_radius: 4.0,
        attraction_radius: Some(1.5),
        spatial,
        ..FieldConfig::default()
    };
    let mut field = ParticleField::initialize(
        capacity,
        Distribution::SphereVolume { radius: 6.0 },
        config,
        SpawnContext::seeded(42),
    );
    field.step(1.0 / 60.0, Some(Vec3::new(2.0, 0.0, 0.0)));
    field
}

fn strategies() -> [(&'static str, SpatialStrategy); 2] {
    [
        ("brute", SpatialStrategy::BruteForce),
        ("grid", SpatialStrategy::Grid(SpatialConfig::new(1.5, 16))),
    ]
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");

    for (name, spatial) in strategies() {
        for &size in &SIZES {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                let mut field = warmed_field(size, spatial);
                let mut t = 1.0 / 60.0;
                b.iter(|| {
                    t += 1.0 / 60.0;
                    black_box(field.step(t, None))
                })
            });
        }
    }

    group.finish();
}

fn bench_find_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_edges");

    for (name, spatial) in strategies() {
        for &size in &SIZES {
            let snapshot = warmed_field(size, SpatialStrategy::BruteForce).snapshot();
            group.bench_with_input(BenchmarkId::new(name, size), &snapshot, |b, snapshot| {
                let mut index = spatial.build();
                b.iter(|| black_box(find_edges(snapshot, 1.2, None, index.as_mut())))
            });
        }
    }

    group.finish();
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");

    for &size in &SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut field = warmed_field(size, SpatialStrategy::BruteForce);
            let mut graph = ConnectionGraph::new(ConnectionConfig::default());
            b.iter(|| black_box(graph.recompute(&mut field, 1.2).len()))
        });
    }

    group.finish();
}

fn bench_scene_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_frame");

    for name in coreflow_fx::presets::PRESET_NAMES {
        group.bench_function(*name, |b| {
            let mut scene = Scene::preset(name, Some(1)).unwrap();
            let mut time = Time::new();
            b.iter(|| {
                time.advance(1.0 / 60.0);
                black_box(scene.frame(&time, Some(Vec2::new(0.1, 0.1))))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_step,
    bench_find_edges,
    bench_recompute,
    bench_scene_frame,
);
criterion_main!(benches);
