use classpack::merge::strip_comments;
use classpack::{DependencySet, Identity, Sequencer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Chain discovered leaf-first: every unit depends on the one after it.
fn reversed_chain(n: usize) -> Vec<(Identity, DependencySet)> {
    (0..n)
        .map(|i| {
            let mut deps = DependencySet::new();
            if i + 1 < n {
                deps.insert(Identity::new(format!("App\\Unit{}", i + 1)));
            }
            (Identity::new(format!("App\\Unit{}", i)), deps)
        })
        .collect()
}

/// Wide layered graph: each unit depends on a few units of the previous layer.
fn layered(layers: usize, width: usize) -> Vec<(Identity, DependencySet)> {
    let mut edges = Vec::with_capacity(layers * width);
    for layer in (0..layers).rev() {
        for slot in 0..width {
            let mut deps = DependencySet::new();
            if layer > 0 {
                for k in 0..3 {
                    let target = (slot + k * 7) % width;
                    deps.insert(Identity::new(format!("L{}\\T{}", layer - 1, target)));
                }
            }
            edges.push((Identity::new(format!("L{}\\T{}", layer, slot)), deps));
        }
    }
    edges
}

/// Pairs of units referencing each other.
fn mutual_pairs(pairs: usize) -> Vec<(Identity, DependencySet)> {
    let mut edges = Vec::with_capacity(pairs * 2);
    for i in 0..pairs {
        let one = Identity::new(format!("X\\One{}", i));
        let two = Identity::new(format!("X\\Two{}", i));
        edges.push((one.clone(), [two.clone()].into_iter().collect()));
        edges.push((two, [one].into_iter().collect()));
    }
    edges
}

fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer");
    let sequencer = Sequencer::new();

    for n in [50usize, 200, 800] {
        let edges = reversed_chain(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("reversed_chain", n), &edges, |b, edges| {
            b.iter(|| sequencer.sequence_edges(black_box(edges.clone())));
        });
    }

    let edges = layered(8, 64);
    group.throughput(Throughput::Elements(edges.len() as u64));
    group.bench_with_input(BenchmarkId::new("layered", "8x64"), &edges, |b, edges| {
        b.iter(|| sequencer.sequence_edges(black_box(edges.clone())));
    });

    let edges = mutual_pairs(100);
    group.throughput(Throughput::Elements(edges.len() as u64));
    group.bench_with_input(BenchmarkId::new("mutual_pairs", 100), &edges, |b, edges| {
        b.iter(|| sequencer.sequence_edges(black_box(edges.clone())));
    });

    group.finish();
}

fn bench_strip_comments(c: &mut Criterion) {
    let unit = "<?php\nnamespace App;\n\n/**\n * Service.\n */\nclass Service\n{\n    // counter\n    private $n = 0; # inline\n\n    public function url() { return 'http://example.test/#frag'; }\n}\n";
    let source = unit.repeat(100);

    c.bench_function("strip_comments", |b| {
        b.iter(|| strip_comments(black_box(&source)));
    });
}

criterion_group!(benches, bench_sequencer, bench_strip_comments);
criterion_main!(benches);
