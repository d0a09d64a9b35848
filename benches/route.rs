use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use routier::fixture::{self, UnitProfile};
use routier::Router;

fn criterion_benchmark(c: &mut Criterion) {
    let fixture = fixture::grid(12);
    let router = Router::new(&fixture.network);
    let profile = UnitProfile;

    let corner = fixture::point_at_vertex(&fixture.network, fixture.vertices[0]);
    let opposite =
        fixture::point_at_vertex(&fixture.network, *fixture.vertices.last().unwrap());

    c.bench_function("resolve", |b| {
        b.iter(|| {
            router
                .try_resolve(
                    &[&profile],
                    black_box(0.00033),
                    black_box(0.00071),
                )
                .unwrap()
        })
    });

    c.bench_function("calculate_weight", |b| {
        b.iter(|| {
            router
                .try_calculate_weight(&profile, black_box(&corner), black_box(&opposite))
                .unwrap()
        })
    });

    c.bench_function("calculate_route", |b| {
        b.iter(|| {
            router
                .try_calculate(&profile, black_box(&corner), black_box(&opposite))
                .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
