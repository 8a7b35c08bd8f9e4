use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fim_eval::matcher::{KeyIndex, digest_key};
use fim_eval::metrics::{BleuStats, TreebankTokenizer, WordTokenizer};
use fim_eval::render::{ContextWindow, DiffInput, render_diff_html};
use fim_eval::store::RecordStore;
use std::hint::black_box;
use std::io::Cursor;
use std::path::Path;

fn completion(i: usize) -> String {
    format!(
        "let value_{i} = items.iter().filter(|x| x.is_valid()).map(|x| x.weight * {i}).sum::<f64>();"
    )
}

fn synthetic_store(n: usize) -> RecordStore {
    let body: String = (0..n)
        .map(|i| {
            serde_json::json!({
                "prefix": format!("fn compute_{i}(items: &[Item]) -> f64 {{\n    // step {i}\n"),
                "suffix": "    value\n}\n",
                "expected": completion(i),
                "generated": format!("{}<|fim_pad|>", completion(i + i % 3)),
            })
            .to_string()
                + "\n"
        })
        .collect();
    RecordStore::from_reader(Path::new("bench.jsonl"), Cursor::new(body)).expect("valid store")
}

// =============================================================================
// Tokenizer Benchmarks
// =============================================================================

fn bench_treebank_tokenize(c: &mut Criterion) {
    let tokenizer = TreebankTokenizer::new();
    let text = (0..50).map(completion).collect::<Vec<_>>().join("\n");

    c.bench_function("treebank_tokenize_50_lines", |b| {
        b.iter(|| black_box(tokenizer.tokenize(black_box(&text))))
    });
}

// =============================================================================
// BLEU Benchmarks
// =============================================================================

fn bench_corpus_bleu(c: &mut Criterion) {
    let tokenizer = TreebankTokenizer::new();
    let mut group = c.benchmark_group("corpus_bleu");

    for size in [100usize, 1000] {
        let pairs: Vec<(Vec<String>, Vec<String>)> = (0..size)
            .map(|i| {
                (
                    tokenizer.tokenize(&completion(i + i % 3)),
                    tokenizer.tokenize(&completion(i)),
                )
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &pairs, |b, pairs| {
            b.iter(|| {
                let mut stats = BleuStats::default();
                for (hyp, reference) in pairs {
                    stats.add(hyp, reference);
                }
                black_box(stats.score())
            })
        });
    }
    group.finish();
}

// =============================================================================
// Matcher & Renderer Benchmarks
// =============================================================================

fn bench_key_index(c: &mut Criterion) {
    let store = synthetic_store(1000);
    let probe = digest_key(&store.records()[999].prefix);

    c.bench_function("key_index_build_and_lookup_1000", |b| {
        b.iter(|| {
            let index = KeyIndex::build(&store);
            black_box(index.position(&probe))
        })
    });
}

fn bench_render_diff(c: &mut Criterion) {
    let prefix = (0..200)
        .map(|i| format!("    let a{i} = b{i} < c{i} && d{i};"))
        .collect::<Vec<_>>()
        .join("\n");
    let input = DiffInput::new(prefix, "}\n", completion(1), completion(2), completion(3));
    let windowed = input.clone().with_window(ContextWindow::default());

    c.bench_function("render_diff_full_context", |b| {
        b.iter(|| black_box(render_diff_html(black_box(&input))))
    });
    c.bench_function("render_diff_windowed", |b| {
        b.iter(|| black_box(render_diff_html(black_box(&windowed))))
    });
}

criterion_group!(
    benches,
    bench_treebank_tokenize,
    bench_corpus_bleu,
    bench_key_index,
    bench_render_diff
);
criterion_main!(benches);
