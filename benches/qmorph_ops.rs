//! Benchmarks for mesh construction and conversion.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use qmorph::prelude::*;

fn grid_triangles(n: usize) -> Vec<[f64; 6]> {
    let mut triangles = Vec::with_capacity(n * n * 2);
    for j in 0..n {
        for i in 0..n {
            let (x0, y0) = (i as f64, j as f64);
            let (x1, y1) = (x0 + 1.0, y0 + 1.0);
            triangles.push([x0, y0, x1, y0, x1, y1]);
            triangles.push([x0, y0, x1, y1, x0, y1]);
        }
    }
    triangles
}

fn create_grid_mesh(n: usize) -> Mesh {
    build_from_triangles(&grid_triangles(n)).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let triangles = grid_triangles(20);
    c.bench_function("build_grid_20x20", |b| {
        b.iter(|| build_from_triangles(&triangles).unwrap());
    });
}

fn bench_front(c: &mut Criterion) {
    c.bench_function("init_front_20x20", |b| {
        b.iter_batched(
            || QMorph::new(create_grid_mesh(20), QMorphOptions::default()).unwrap(),
            |mut engine| {
                engine.init().unwrap();
                engine
            },
            BatchSize::SmallInput,
        );
    });

    let mut engine = QMorph::new(create_grid_mesh(20), QMorphOptions::default()).unwrap();
    engine.init().unwrap();
    let mesh = engine.into_mesh();
    c.bench_function("next_front_20x20", |b| {
        b.iter(|| mesh.next_front(2.5));
    });
}

fn bench_convert(c: &mut Criterion) {
    for n in [5, 10] {
        c.bench_function(&format!("convert_grid_{n}x{n}"), |b| {
            b.iter_batched(
                || create_grid_mesh(n),
                |mesh| {
                    let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
                    engine.run().unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }

    c.bench_function("convert_grid_10x10_no_smooth", |b| {
        b.iter_batched(
            || create_grid_mesh(10),
            |mesh| {
                let options = QMorphOptions::default().without_smoothing();
                let mut engine = QMorph::new(mesh, options).unwrap();
                engine.run().unwrap()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mesh_construction, bench_front, bench_convert);
criterion_main!(benches);
