use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use trieve_search::core::types::DocId;
use trieve_search::trie::Trie;

fn random_word(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| (b'a' + rng.gen_range(0..26)) as char).collect()
}

fn build_trie(n: usize) -> Trie {
    let mut rng = rand::thread_rng();
    let mut trie = Trie::new();
    for i in 0..n {
        let word = random_word(&mut rng, 6 + (i % 5));
        trie.insert(&word, DocId::new(format!("doc-{i}"))).unwrap();
    }
    trie
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("trie_insert");
    for size in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut trie = Trie::new();
                let mut rng = rand::thread_rng();
                for i in 0..size {
                    let word = random_word(&mut rng, 8);
                    trie.insert(&word, DocId::new(format!("doc-{i}"))).unwrap();
                }
                black_box(trie.node_count())
            });
        });
    }
    group.finish();
}

fn bench_exact_search(c: &mut Criterion) {
    let trie = build_trie(10_000);
    c.bench_function("trie_exact_search", |b| {
        b.iter(|| black_box(trie.exact_search("aaaaaa")));
    });
}

fn bench_prefix_search(c: &mut Criterion) {
    let trie = build_trie(10_000);
    c.bench_function("trie_prefix_search", |b| {
        b.iter(|| black_box(trie.prefix_search("aa")));
    });
}

fn bench_fuzzy_search(c: &mut Criterion) {
    let trie = build_trie(5_000);
    c.bench_function("trie_fuzzy_search", |b| {
        b.iter(|| black_box(trie.fuzzy_search("aaaaab", 2)));
    });
}

criterion_group!(benches, bench_insert, bench_exact_search, bench_prefix_search, bench_fuzzy_search);
criterion_main!(benches);
