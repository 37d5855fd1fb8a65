use criterion::{criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;
use vsm_core::tokenizer::normalize;
use vsm_core::{build_model, search, DocumentInput};

const TEXT: &str = include_str!("fixtures/sample.txt");

fn corpus() -> IndexMap<String, DocumentInput> {
    TEXT.split("\n\n")
        .enumerate()
        .map(|(i, para)| (format!("p{i}"), DocumentInput::new(format!("p{i}.txt"), para, "text/plain")))
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_sample", |b| b.iter(|| normalize(TEXT)));
}

fn bench_build_and_search(c: &mut Criterion) {
    let docs = corpus();
    c.bench_function("build_model_sample", |b| b.iter(|| build_model(&docs)));
    let model = build_model(&docs).expect("non-empty corpus");
    c.bench_function("search_sample", |b| b.iter(|| search("vector space ranking", &model)));
}

criterion_group!(benches, bench_normalize, bench_build_and_search);
criterion_main!(benches);
