use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use papertrail_diff::{align, DocumentDiffer};
use papertrail_types::{Document, Section};

const WORDS: &[&str] = &[
    "model", "data", "results", "we", "show", "that", "the", "method", "improves", "accuracy",
    "baseline", "training", "evaluation", "corpus", "section", "paper",
];

fn paper(sections: usize, seed: usize) -> Vec<Section> {
    (0..sections)
        .map(|i| {
            let text: Vec<&str> = (0..60)
                .map(|w| WORDS[(i * 7 + w * 3 + seed) % WORDS.len()])
                .collect();
            Section::new(format!("Section {i}"), text.join(" "))
        })
        .collect()
}

/// Reverse the sections and retitle them, so no positional match applies.
fn shuffled(sections: &[Section]) -> Vec<Section> {
    sections
        .iter()
        .rev()
        .enumerate()
        .map(|(i, s)| Section::new(format!("Part {i}"), s.text.clone()))
        .collect()
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    for n in [8, 32, 64] {
        let old = paper(n, 0);
        let new = shuffled(&old);
        group.bench_with_input(BenchmarkId::new("global", n), &n, |b, _| {
            b.iter(|| align(black_box(&old), black_box(&new)))
        });
        let edited = paper(n, 1);
        group.bench_with_input(BenchmarkId::new("positional", n), &n, |b, _| {
            b.iter(|| align(black_box(&old), black_box(&edited)))
        });
    }
    group.finish();
}

fn bench_document_diff(c: &mut Criterion) {
    let old = Document::from_sections(paper(32, 0));
    let new = Document::from_sections(paper(32, 1));
    let differ = DocumentDiffer::default();
    c.bench_function("diff_sections/32", |b| {
        b.iter(|| differ.diff_sections(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, bench_align, bench_document_diff);
criterion_main!(benches);
