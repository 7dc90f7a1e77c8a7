//! Benchmarks for symbol resolution and filter rendering.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gene_resolver::dictionary::GeneDictionary;
use gene_resolver::filter::render_filter;
use gene_resolver::gene::{GeneRecord, Organism, StableId};
use gene_resolver::resolver::{resolve_tokens, DisambiguationPolicy};

/// 20k synthetic genes; every 50th symbol also has an lncRNA copy.
fn synthetic_dictionary() -> GeneDictionary {
    let mut records = Vec::with_capacity(20_400);
    for i in 0..20_000u64 {
        let symbol = format!("GENE{i}");
        records.push(GeneRecord::new(
            format!("ENSG{:011}", i),
            symbol.clone(),
            "protein_coding",
        ));
        if i % 50 == 0 {
            records.push(GeneRecord::new(
                format!("ENSG{:011}", 100_000 + i),
                symbol,
                "lncRNA",
            ));
        }
    }
    GeneDictionary::from_records(Organism::HomoSapiens, "bench", records).unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let dict = synthetic_dictionary();
    let policy = DisambiguationPolicy::default();
    let tokens: Vec<String> = (0..500).map(|i| format!("gene{}", i * 37)).collect();

    c.bench_function("resolve_500_tokens", |bench| {
        bench.iter(|| black_box(resolve_tokens(&dict, &tokens, &policy)))
    });
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_dictionary_20k", |bench| {
        bench.iter(|| black_box(synthetic_dictionary()))
    });
}

fn bench_render(c: &mut Criterion) {
    let ids: Vec<StableId> = (0..1_000u64)
        .rev()
        .map(|i| StableId::new(format!("ENSG{:011}", i)))
        .collect();

    c.bench_function("render_filter_1k", |bench| {
        bench.iter(|| black_box(render_filter(&ids).unwrap()))
    });
}

criterion_group!(benches, bench_resolve, bench_build, bench_render);
criterion_main!(benches);
