//! Routing benchmarks.
//!
//! Run with: `cargo bench -p daedalus-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use daedalus_core::{Exchange, Flow, Handler, HandlerChain};
use daedalus_router::Router;
use http::Method;

fn chain(name: String) -> HandlerChain {
    HandlerChain::from_iter([Handler::new(name, |_ex: &mut Exchange| Flow::Halt)])
}

fn build_router(num_routes: usize) -> Router {
    let mut router = Router::new();

    for i in 0..num_routes / 3 {
        router
            .bind(Method::GET, &format!("/api/resource{i}"), chain(format!("list{i}")))
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        router
            .bind(Method::GET, &format!("/api/resource{i}/:id?"), chain(format!("find{i}")))
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        router
            .bind(
                Method::GET,
                &format!("/api/org/:org/resource{i}/:id"),
                chain(format!("orgFind{i}")),
            )
            .unwrap();
    }

    router
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/resource20")));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/resource25/12345")));
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/org/acme/resource10/12345")));
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/nonexistent/path")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [30, 300, 3000] {
        let router = build_router(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &router, |b, router| {
            b.iter(|| black_box(router.match_route(&Method::GET, "/api/resource7/1")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_nested_param_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
