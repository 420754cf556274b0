//! `integrator` tests lists of genes for the over-representation of
//! enrichment classes, such as pathways or GO terms.
//!
//! The main entry point is the [`Enricher`]. It maps every gene of an input
//! list onto the enrichment classes it belongs to, calculates a
//! hypergeometric p-value for every class that was hit at least once,
//! corrects all p-values for multiple testing and returns the classes
//! ranked by their p-value.
//!
//! The data the analysis needs is consumed through a few narrow traits
//! in [`mapper`]:
//! - a [`GeneMapper`](mapper::GeneMapper) from canonical gene ids to classes
//! - a [`ClassNameMapper`](mapper::ClassNameMapper) from classes to readable names
//! - an optional [`IdentifierSource`](mapper::IdentifierSource) to translate
//!   gene symbols, probe ids etc. into canonical gene ids
//!
//! [`GeneSets`](mapper::GeneSets) is an in-memory implementation of both
//! class mappers.
//!
//! # Examples
//!
//! ```
//! use integrator::mapper::GeneSets;
//! use integrator::{Enricher, GeneId, GeneInput};
//!
//! let mut sets = GeneSets::new("Pathway enrichment", None).with_genome_size(100);
//! sets.insert("path:1", "Glycolysis", (1..=10).map(GeneId::from));
//! sets.insert("path:2", "Citrate cycle", (5..=40).map(GeneId::from));
//!
//! let enricher = Enricher::from_kind(sets, None).unwrap();
//!
//! let genes: Vec<GeneInput<GeneId>> = (1..=8).map(|id| GeneInput::from(GeneId::from(id))).collect();
//! let result = enricher.enrichments(&genes, None, None).unwrap();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].name(), "Glycolysis");
//! assert_eq!(result[0].enriched(), 8);
//! assert!(result[0].pvalue() < result[1].pvalue());
//! assert!(result[0].qvalue().is_some());
//! ```
//!
//! Results of several analyses can be combined with
//! [`merge_enrichments`](stats::merge::merge_enrichments). Merged results
//! have no q-value, run [`set_qvalues`](stats::correction::set_qvalues)
//! on the merged list to get them back.
use std::num::ParseIntError;

use thiserror::Error;

pub mod enrichment;
pub mod genes;
pub mod mapper;
pub mod progress;
pub mod stats;

pub use enrichment::{Enricher, EnricherBuilder, EnrichmentConfig, EnrichmentKind};
pub use genes::{ExpressedGene, GeneId, GeneInput, HasGeneId, IdentifierType, Member, Species};
pub use stats::correction::{Correction, FdrCorrection};
pub use stats::merge::{MergeType, Mergeable};
pub use stats::Enrichment;

/// Main Error type for this crate
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntegratorError {
    /// No mapping from genes to enrichment classes is available
    #[error("no gene to enrichment class mapping available")]
    MissingMapping,
    /// Two mappings (or a mapping and the analysis) are for different species
    #[error("mappings are for different species: {0} and {1}")]
    SpeciesMismatch(String, String),
    /// No mapper exists to translate identifiers of the given type
    #[error("unable to map identifiers of type {0} to gene ids")]
    MapperUnavailable(IdentifierType),
    /// A single identifier or class is not present in a mapping
    #[error("{0} is not present in the mapping")]
    NotMapped(String),
    /// Failed to parse an integer
    #[error("unable to parse Integer")]
    ParseIntError,
    /// The name does not match any known identifier type
    #[error("unknown identifier type {0}")]
    InvalidIdentifierType(String),
    /// Statistical parameters that do not describe a valid distribution
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Tried to merge an empty list of enrichments
    #[error("nothing to merge")]
    EmptyMerge,
}

impl From<ParseIntError> for IntegratorError {
    fn from(_: ParseIntError) -> Self {
        IntegratorError::ParseIntError
    }
}

/// Shortcut for `Result<T, IntegratorError>`
pub type IntegratorResult<T> = Result<T, IntegratorError>;

/// Counts never exceed the size of a genome, so the conversion
/// to `f64` is lossless in practice
#[allow(clippy::cast_precision_loss)]
fn f64_from_u64(n: u64) -> f64 {
    n as f64
}

/// Converts a collection length into a count
fn u64_from_usize(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
