//! Criterion benchmarks for [`DisplayLayout`] critical path operations.
//!
//! Every local pointer event that leaves the active display triggers a
//! `find_point`, and every roster or monitor change rebuilds the layout, so
//! both need to stay well below one frame.
//!
//! Run with:
//! ```bash
//! cargo bench --package kvm-core --bench layout_bench
//! ```

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kvm_core::{Desktop, DesktopName, DisplayLayout, Point, Rectangle};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// Creates `n` desktops, each with a 1280×1024 monitor to the left of a
/// 1920×1080 primary.
fn desktops(n: usize) -> Vec<Desktop> {
    let side = Rectangle::new(-1280, 0, 1280, 1024);
    let main = Rectangle::new(0, 0, 1920, 1080);
    (0..n)
        .map(|i| Desktop::new(format!("desktop-{i}"), vec![side, main], Some(main)))
        .collect()
}

fn offsets(n: usize) -> HashMap<DesktopName, i32> {
    (0..n)
        .map(|i| (DesktopName::new(format!("desktop-{i}")), (i as i32 % 3) * 40))
        .collect()
}

// ── Benchmarks: build ─────────────────────────────────────────────────────────

fn bench_build_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_build");

    for &count in &[1usize, 4, 8, 16] {
        let list = desktops(count);
        let y = offsets(count);
        group.bench_with_input(BenchmarkId::new("desktops", count), &count, |b, _| {
            b.iter(|| DisplayLayout::build(black_box(&list), black_box(&y)))
        });
    }

    group.finish();
}

// ── Benchmarks: find_point ────────────────────────────────────────────────────

fn bench_find_point_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_point");

    for &count in &[1usize, 4, 8, 16] {
        let layout = DisplayLayout::build(&desktops(count), &HashMap::new())
            .expect("fixture layout must build");

        // Worst case: the last display in the linear scan.
        let last = layout.displays().last().map(|d| d.global.center()).unwrap_or_default();
        group.bench_with_input(BenchmarkId::new("last_display", count), &last, |b, &p| {
            b.iter(|| layout.find_point(black_box(p)))
        });

        // Miss: a point below every display.
        let gap = Point::new(10, 5000);
        group.bench_with_input(BenchmarkId::new("gap", count), &gap, |b, &p| {
            b.iter(|| layout.find_point(black_box(p)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_scaling, bench_find_point_scaling);
criterion_main!(benches);
