use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rayon::prelude::*;

use integrator::mapper::GeneSets;
use integrator::stats::hypergeom::{HypergeometricTest, PvalueCalculator};
use integrator::{Correction, Enricher, FdrCorrection, GeneId, GeneInput};

const GENOME_SIZE: u32 = 20_000;

/// 2,000 overlapping gene sets of 20 to 400 genes each
fn gene_sets() -> GeneSets<u32> {
    let mut sets = GeneSets::new("Benchmark enrichment", None).with_genome_size(u64::from(GENOME_SIZE));
    for class in 0..2_000u32 {
        let start = (class * 37) % GENOME_SIZE + 1;
        let size = 20 + (class * 13) % 380;
        let genes = (start..start + size).map(|id| GeneId::from((id - 1) % GENOME_SIZE + 1));
        sets.insert(class, &format!("Class {class}"), genes);
    }
    sets
}

fn gene_list(seed: u32, len: u32) -> Vec<GeneInput<GeneId>> {
    (0..len)
        .map(|i| GeneInput::from(GeneId::from((seed * 7_919 + i * 104_729) % GENOME_SIZE + 1)))
        .collect()
}

fn sequential(enricher: &Enricher<u32>, lists: &[Vec<GeneInput<GeneId>>]) -> usize {
    lists
        .iter()
        .map(|genes| enricher.enrichments(genes, None, None).unwrap().len())
        .sum()
}

fn parallel(enricher: &Enricher<u32>, lists: &[Vec<GeneInput<GeneId>>]) -> usize {
    lists
        .par_iter()
        .map(|genes| enricher.enrichments(genes, None, None).unwrap().len())
        .sum()
}

fn pvalue_benchmark(c: &mut Criterion) {
    let test = HypergeometricTest::new(20_000, 500).unwrap();
    c.bench_function("pvalue 500 genes", |b| {
        b.iter(|| {
            (1..50u64)
                .map(|overlap| test.pvalue(black_box(400), black_box(overlap)))
                .sum::<f64>()
        })
    });

    let pvalues: Vec<f64> = (1..=5_000u32).map(|i| f64::from(i) / 5_001.0).collect();
    c.bench_function("benjamini-hochberg 5000", |b| {
        b.iter(|| FdrCorrection::BenjaminiHochberg.adjust(black_box(&pvalues)))
    });
}

fn enrichment_benchmark(c: &mut Criterion) {
    let enricher = Enricher::from_kind(gene_sets(), None).unwrap();
    let lists: Vec<Vec<GeneInput<GeneId>>> = (0..16).map(|seed| gene_list(seed, 500)).collect();

    c.bench_function("enrichment 500 genes", |b| {
        b.iter(|| enricher.enrichments(black_box(&lists[0]), None, None).unwrap())
    });

    c.bench_function("enrichment 16 lists", |b| {
        b.iter(|| sequential(black_box(&enricher), black_box(&lists)))
    });

    c.bench_function("enrichment-parallel 16 lists", |b| {
        b.iter(|| parallel(black_box(&enricher), black_box(&lists)))
    });
}

criterion_group!(enrichment, pvalue_benchmark, enrichment_benchmark);
criterion_main!(enrichment);
