use std::process;
use std::sync::Arc;

use simple_logger::SimpleLogger;

use integrator::mapper::{GeneSets, IdentifierTable, IdentifierTables};
use integrator::progress::LoggingProgress;
use integrator::stats::correction::set_qvalues;
use integrator::stats::merge::merge_enrichments;
use integrator::stats::sort_by_pvalue;
use integrator::{
    Enricher, EnricherBuilder, Enrichment, ExpressedGene, FdrCorrection, GeneId, GeneInput,
    IdentifierType, MergeType, Species,
};

const GENOME_SIZE: u64 = 500;

/// A handful of pathways with made up members
fn pathways() -> GeneSets<String> {
    let mut sets = GeneSets::new("Pathway enrichment", Some(Species::human()))
        .with_genome_size(GENOME_SIZE);
    let pathways = [
        ("path:hsa00010", "Glycolysis / Gluconeogenesis", 1..=40),
        ("path:hsa00020", "Citrate cycle (TCA cycle)", 30..=60),
        ("path:hsa04110", "Cell cycle", 100..=180),
        ("path:hsa04115", "p53 signaling pathway", 160..=200),
        ("path:hsa04210", "Apoptosis", 190..=260),
        ("path:hsa04310", "Wnt signaling pathway", 300..=420),
    ];
    for (id, name, genes) in pathways {
        sets.insert(id.to_string(), name, genes.map(GeneId::from));
    }
    sets
}

/// Gene symbols `G1`, `G2`... for all genes of the genome
fn symbols() -> IdentifierTables {
    let mut table = IdentifierTable::new(IdentifierType::GeneSymbol, Some(Species::human()));
    for id in 1..=500u32 {
        table.insert(&format!("G{id}"), GeneId::from(id));
    }
    let mut tables = IdentifierTables::new();
    tables.insert(table);
    tables
}

/// Simulates a differential expression dataset, every `step`th gene of the range
fn dataset(start: u32, end: u32, step: usize, fold_change: f64) -> Vec<GeneInput<ExpressedGene>> {
    (start..=end)
        .step_by(step)
        .map(|id| {
            GeneInput::Bundle(ExpressedGene::new(
                GeneId::from(id),
                &format!("G{id}"),
                fold_change + f64::from(id % 7) / 10.0,
            ))
        })
        .collect()
}

fn print_enrichments(title: &str, enrichments: &[Enrichment<String, ExpressedGene>], output_len: usize) {
    println!("\n### {title} ###");
    println!("id\tname\tlist ratio\tgenome ratio\tp-value\tq-value");
    for enrichment in enrichments.iter().take(output_len) {
        println!("{enrichment}");
    }
}

fn main() {
    SimpleLogger::new().env().init().unwrap();

    let mut args = std::env::args();
    if args.len() > 3 {
        println!("Show enriched pathways of two simulated datasets\n\n");
        println!("Usage\nenrichment <N RESULTS> <bh|bonferroni|holm>");
        process::exit(1)
    }

    let output_len = args
        .nth(1)
        .map(|arg| arg.parse::<usize>().unwrap_or(10))
        .unwrap_or(10);

    let correction = match args.next().as_deref() {
        Some("bonferroni") => FdrCorrection::Bonferroni,
        Some("holm") => FdrCorrection::BonferroniHolm,
        _ => FdrCorrection::BenjaminiHochberg,
    };

    let enricher: Enricher<String> = EnricherBuilder::new()
        .kind(pathways())
        .identifiers(Arc::new(symbols()))
        .correction(Some(correction))
        .build()
        .unwrap();

    let mut progress = LoggingProgress::new(enricher.name());
    let first = enricher
        .enrichments(&dataset(1, 200, 3, 1.5), None, Some(&mut progress))
        .unwrap();
    print_enrichments("Dataset 1", &first, output_len);

    let second = enricher
        .enrichments(&dataset(20, 260, 4, -0.8), None, Some(&mut progress))
        .unwrap();
    print_enrichments("Dataset 2", &second, output_len);

    let mut merged = merge_enrichments(first.into_iter().chain(second), MergeType::Mean);
    set_qvalues(&mut merged, &correction);
    sort_by_pvalue(&mut merged);
    print_enrichments("Merged", &merged, output_len);

    let symbols: Vec<GeneInput<ExpressedGene>> = ["G1", "G2", "G31", "G33", "G170", "unknown"]
        .map(GeneInput::from)
        .to_vec();
    let by_symbol = enricher
        .enrichments(&symbols, Some(IdentifierType::GeneSymbol), None)
        .unwrap();
    print_enrichments("Gene symbols", &by_symbol, output_len);

    if let Some(top) = merged.first() {
        println!("\nGenes of {}:", top.name());
        for member in top.members() {
            if let Some(gene) = member.bundle() {
                println!("{gene}");
            }
        }
    }
}
