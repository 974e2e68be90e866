use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use steller::spatial::{brute_force_pairs, indexed_pairs};
use steller::{DiagramType, Graph, LayoutConfig, Node, Rect, Resolver, ResolutionStrategy};
use std::hint::black_box;
use std::time::Duration;

/// Deterministic clustered scatter: boxes crowd into a few hot spots so both detectors find work.
fn scattered(n: usize) -> Vec<Rect> {
    (0..n)
        .map(|i| {
            let cluster = (i % 5) as f64;
            let x = 200.0 + cluster * 300.0 + ((i * 37) % 97) as f64 * 2.5;
            let y = 150.0 + ((i * 53) % 89) as f64 * 8.0;
            Rect::new(x, y, 80.0 + (i % 4) as f64 * 20.0, 36.0)
        })
        .collect()
}

fn network(n: usize) -> Graph {
    let mut g = Graph::new(DiagramType::Network);
    for i in 0..n {
        g.add_node(Node::new(format!("n{i}")));
    }
    for i in 0..n {
        g.add_edge(format!("n{i}"), format!("n{}", (i + 1) % n));
        g.add_edge(format!("n{i}"), format!("n{}", (i * 7 + 3) % n));
    }
    g
}

fn bench_overlap_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_detection");
    group.measurement_time(Duration::from_secs(5));

    for n in [20usize, 100, 400] {
        let rects = scattered(n);
        group.bench_with_input(BenchmarkId::new("brute_force", n), &rects, |b, rects| {
            b.iter(|| black_box(brute_force_pairs(black_box(rects), 20.0).len()))
        });
        group.bench_with_input(BenchmarkId::new("grid_index", n), &rects, |b, rects| {
            b.iter(|| black_box(indexed_pairs(black_box(rects), 20.0).len()))
        });
    }
    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.measurement_time(Duration::from_secs(5));
    let config = LayoutConfig::default();

    for n in [10usize, 40] {
        let rects = scattered(n);
        group.bench_with_input(BenchmarkId::new("adaptive", n), &rects, |b, rects| {
            b.iter_batched(
                || rects.clone(),
                |mut rects| {
                    let outcome =
                        Resolver::new(&config).run(ResolutionStrategy::Adaptive, &mut rects, &[]);
                    black_box(outcome.iterations);
                },
                BatchSize::SmallInput,
            )
        });

        let graph = network(n);
        group.bench_with_input(BenchmarkId::new("network_layout", n), &graph, |b, graph| {
            b.iter(|| black_box(steller::layout(graph, &config).map(|r| r.nodes.len())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_overlap_detection, bench_resolution);
criterion_main!(benches);
