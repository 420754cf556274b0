//! Mappings that an enrichment analysis consumes
//!
//! The analysis itself does not know where gene annotations come from.
//! It only relies on the traits in this module:
//!
//! - [`GeneMapper`] maps a [`GeneId`] to the enrichment classes that contain
//!   the gene and knows the sizes of the classes and the genome
//! - [`ClassNameMapper`] translates an enrichment class identifier into a
//!   human readable name
//! - [`IdentifierSource`] provides [`IdentifierMapper`]s to translate other
//!   identifiers (gene symbols, probe ids...) into [`GeneId`]s
//!
//! Mappers are shared read-only between analyses, so all of them must be `Send + Sync`.
//!
//! [`GeneSets`] and [`IdentifierTables`] are in-memory implementations.

use crate::genes::{GeneId, IdentifierType, Species};
use crate::IntegratorResult;

mod gene_sets;
mod identifiers;

pub use gene_sets::GeneSets;
pub use identifiers::{IdentifierTable, IdentifierTables};

/// Maps genes to the enrichment classes (pathways, GO terms...) they are part of
pub trait GeneMapper<K>: Send + Sync {
    /// Returns all enrichment classes that contain the gene
    ///
    /// # Errors
    ///
    /// Implementations can return an error if the lookup fails. The
    /// enrichment analysis logs the error and skips the gene.
    fn classes(&self, gene: GeneId) -> IntegratorResult<Vec<K>>;

    /// The total number of genes in the genome (the background population)
    fn genome_size(&self) -> u64;

    /// The total number of genes in the genome that belong to the class
    fn class_size(&self, class: &K) -> u64;

    /// The species the mapping was built for, if known
    fn species(&self) -> Option<&Species> {
        None
    }
}

/// Translates enrichment class identifiers into human readable names
pub trait ClassNameMapper<K>: Send + Sync {
    /// Returns `false` while the mapping can't be used yet
    fn is_ready(&self) -> bool {
        true
    }

    /// Returns the name of the enrichment class
    ///
    /// # Errors
    ///
    /// Implementations can return an error if the class is unknown. The
    /// enrichment analysis falls back to the class identifier.
    fn name(&self, class: &K) -> IntegratorResult<String>;

    /// The species the mapping was built for, if known
    fn species(&self) -> Option<&Species> {
        None
    }
}

/// Translates a single identifier into a canonical [`GeneId`]
pub trait IdentifierMapper: Send + Sync {
    /// Returns the [`GeneId`] of the identifier
    ///
    /// # Errors
    ///
    /// If the identifier is unknown
    fn gene_id(&self, identifier: &str) -> IntegratorResult<GeneId>;
}

/// Provides [`IdentifierMapper`]s for the identifier types it knows about
pub trait IdentifierSource: Send + Sync {
    /// Returns a mapper from `id_type` identifiers of the `species` to [`GeneId`]s
    ///
    /// # Errors
    ///
    /// [`IntegratorError::MapperUnavailable`](crate::IntegratorError::MapperUnavailable)
    /// if no mapping exists for the identifier type or species
    fn mapper(
        &self,
        id_type: IdentifierType,
        species: Option<&Species>,
    ) -> IntegratorResult<std::sync::Arc<dyn IdentifierMapper>>;
}
