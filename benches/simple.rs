use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pathlang::graph::two_cycles_graph;
use pathlang::query::{self, Algorithm};
use pathlang::{Cfg, Graph};

fn run_rpq(graph: &Graph, regex: &str) {
    query::rpq(graph, regex, None, None).unwrap();
}

fn run_cfpq(cfg: &Cfg, graph: &Graph, algorithm: Algorithm) {
    query::cfpq(cfg, graph, "S", None, None, algorithm).unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut c = c.benchmark_group("Simple");
    c.measurement_time(Duration::from_secs(10)).sample_size(100);
    let small = two_cycles_graph(10, 5, ("a", "b"));
    let large = two_cycles_graph(100, 50, ("a", "b"));
    let dyck = Cfg::from_text("S -> a S b | $", "S").unwrap();

    c.bench_function("rpq star union on 16 vertices", |b| {
        b.iter(|| run_rpq(black_box(&small), "a* | b"))
    });
    c.bench_function("rpq star union on 151 vertices", |b| {
        b.iter(|| run_rpq(black_box(&large), "a* | b"))
    });
    c.bench_function("bfs rpq merged on 151 vertices", |b| {
        b.iter(|| query::bfs_rpq(black_box(&large), "a*", None, None, false).unwrap())
    });
    c.bench_function("cfpq hellings on 16 vertices", |b| {
        b.iter(|| run_cfpq(black_box(&dyck), black_box(&small), Algorithm::Hellings))
    });
    c.bench_function("cfpq matrix on 16 vertices", |b| {
        b.iter(|| run_cfpq(black_box(&dyck), black_box(&small), Algorithm::Matrix))
    });
    c.bench_function("cfpq tensor on 16 vertices", |b| {
        b.iter(|| run_cfpq(black_box(&dyck), black_box(&small), Algorithm::Tensor))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
