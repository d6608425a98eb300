//! Octree benchmarks.
//!
//! - **build**: parallel empty build at several depths, rayon vs inline
//! - **insert**: random star cloud into a fresh tree
//! - **query**: radius queries against a populated tree

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use galaxy_octree::{InlineExecutor, Octree, OctreeConfig, RayonExecutor, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROOT_RADIUS: f32 = 1024.0;
const MAX_DEPTH: u32 = 7;

fn star_cloud(count: usize, seed: u64) -> Vec<Vec3> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      Vec3::new(
        rng.random_range(-ROOT_RADIUS..ROOT_RADIUS),
        rng.random_range(-ROOT_RADIUS..ROOT_RADIUS),
        rng.random_range(-ROOT_RADIUS..ROOT_RADIUS),
      )
    })
    .collect()
}

fn populated(points: &[Vec3]) -> Octree {
  let mut octree = Octree::new(Vec3::ZERO, ROOT_RADIUS, MAX_DEPTH);
  for &point in points {
    octree.insert(point);
  }
  octree
}

// =============================================================================
// Build
// =============================================================================

fn bench_build_empty(c: &mut Criterion) {
  let mut group = c.benchmark_group("build_empty");
  group.sample_size(20);

  let config = OctreeConfig::new(Vec3::ZERO, ROOT_RADIUS).with_max_depth(MAX_DEPTH);

  // 1024 / 2^depth
  for depth in [3u32, 4, 5] {
    let leaf_radius = ROOT_RADIUS / 2f32.powi(depth as i32);

    group.bench_with_input(BenchmarkId::new("rayon", depth), &leaf_radius, |b, &leaf| {
      b.iter(|| {
        let mut octree =
          Octree::<()>::with_executor(config.clone(), Arc::new(RayonExecutor::new())).unwrap();
        black_box(octree.build_empty(leaf).unwrap())
      })
    });

    group.bench_with_input(BenchmarkId::new("inline", depth), &leaf_radius, |b, &leaf| {
      b.iter(|| {
        let mut octree =
          Octree::<()>::with_executor(config.clone(), Arc::new(InlineExecutor)).unwrap();
        black_box(octree.build_empty(leaf).unwrap())
      })
    });
  }

  group.finish();
}

// =============================================================================
// Insert / Query
// =============================================================================

fn bench_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("insert");

  for count in [1_000usize, 10_000] {
    let points = star_cloud(count, 42);
    group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
      b.iter(|| black_box(populated(points)))
    });
  }

  group.finish();
}

fn bench_query(c: &mut Criterion) {
  let mut group = c.benchmark_group("query");

  let points = star_cloud(20_000, 7);
  let octree = populated(&points);
  let probes: Vec<Vec3> = points.iter().step_by(200).copied().collect();

  for radius in [16.0f32, 64.0, 256.0] {
    group.bench_with_input(BenchmarkId::new("radius", radius as u32), &radius, |b, &radius| {
      let mut results = Vec::new();
      b.iter(|| {
        for &probe in &probes {
          results.clear();
          octree.query_into(black_box(probe), radius, &mut results);
        }
        black_box(results.len())
      })
    });
  }

  group.finish();
}

criterion_group!(build, bench_build_empty);
criterion_group!(points, bench_insert, bench_query);

criterion_main!(build, points);
