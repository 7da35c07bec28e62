use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use sightline_index::BoundingVolumeIndex;

fn make_index(sphere_count: usize, spacing: f32) -> BoundingVolumeIndex {
    let mut index = BoundingVolumeIndex::new(100.0);
    let side = (sphere_count as f32).sqrt().ceil() as usize;
    for i in 0..sphere_count {
        let x = (i % side) as f32 * spacing;
        let z = (i / side) as f32 * spacing;
        index.push(Vec3::new(x, 0.0, z), 1.0);
    }
    index
}

fn bench_evaluate_stationary(sphere_count: usize, iterations: usize) {
    let mut index = make_index(sphere_count, 4.0);
    index.set_reference_point(Vec3::ZERO);
    let mut out = Vec::new();
    index.evaluate(&mut out); // settle first-frame notifications

    let start = Instant::now();
    for _ in 0..iterations {
        out.clear();
        index.evaluate(black_box(&mut out));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  evaluate stationary ({sphere_count} spheres, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_evaluate_moving(sphere_count: usize, iterations: usize) {
    let mut index = make_index(sphere_count, 4.0);
    let mut out = Vec::new();

    let start = Instant::now();
    for i in 0..iterations {
        index.set_reference_point(Vec3::new(i as f32 * 2.0, 0.0, 0.0));
        out.clear();
        index.evaluate(black_box(&mut out));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  evaluate moving ({sphere_count} spheres, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("bench: visibility evaluation");
    for count in [1_000, 10_000, 100_000] {
        bench_evaluate_stationary(count, 200);
        bench_evaluate_moving(count, 200);
    }
}
