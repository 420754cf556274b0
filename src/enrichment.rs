//! The enrichment analysis of gene lists
//!
//! An [`Enricher`] runs over-representation analyses of one kind, e.g.
//! pathway enrichment, for any number of input gene lists. Every kind of
//! analysis provides its default mappers through the [`EnrichmentKind`] trait.
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::genes::{GeneId, GeneInput, HasGeneId, IdentifierType, Member, Species};
use crate::mapper::{ClassNameMapper, GeneMapper, IdentifierMapper, IdentifierSource};
use crate::progress::ProgressReporter;
use crate::stats::correction::{set_qvalues, FdrCorrection};
use crate::stats::hypergeom::{HypergeometricTest, PvalueCalculator};
use crate::stats::{sort_by_pvalue, Counts, Enrichment};
use crate::{u64_from_usize, IntegratorError, IntegratorResult};

mod builder;
pub use builder::EnricherBuilder;

/// A kind of enrichment analysis, e.g. pathway or GO term enrichment
///
/// The kind provides the mappers that an [`Enricher`] uses unless other
/// mappers are set explicitly in the [`EnricherBuilder`].
pub trait EnrichmentKind<K> {
    /// The human readable name of the analysis, e.g. `"Pathway enrichment"`
    fn name(&self) -> String;

    /// Returns the default mapping from genes to enrichment classes
    ///
    /// # Errors
    ///
    /// [`IntegratorError::SpeciesMismatch`] if no mapping for the species exists.
    /// Implementations can return other errors if the mapping can't be loaded.
    fn gene_mapper(&self, species: Option<&Species>) -> IntegratorResult<Arc<dyn GeneMapper<K>>>;

    /// Returns the default mapping from enrichment classes to names, if any
    ///
    /// # Errors
    ///
    /// [`IntegratorError::SpeciesMismatch`] if no mapping for the species exists.
    /// Implementations can return other errors if the mapping can't be loaded.
    fn name_mapper(
        &self,
        species: Option<&Species>,
    ) -> IntegratorResult<Option<Arc<dyn ClassNameMapper<K>>>>;
}

/// Settings of an [`Enricher`]
///
/// # Examples
///
/// ```
/// use integrator::{EnrichmentConfig, FdrCorrection};
///
/// let config = EnrichmentConfig::default();
/// assert_eq!(config.correction(), Some(FdrCorrection::BenjaminiHochberg));
///
/// let config = config.with_correction(None);
/// assert!(config.correction().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnrichmentConfig {
    correction: Option<FdrCorrection>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            correction: Some(FdrCorrection::default()),
        }
    }
}

impl EnrichmentConfig {
    /// Sets the multiple testing correction, `None` disables the correction
    #[must_use]
    pub fn with_correction(mut self, correction: Option<FdrCorrection>) -> Self {
        self.correction = correction;
        self
    }

    /// The multiple testing correction applied to the results
    pub fn correction(&self) -> Option<FdrCorrection> {
        self.correction
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Enricher` runs the enrichment analysis of input gene lists
///
/// The mappers of an `Enricher` are shared, read-only. One `Enricher` can
/// analyse many lists, also from several threads at once.
///
/// ```mermaid
/// flowchart LR
///     input[Gene list] --> resolve{{resolve gene ids}}
///     ids[(IdentifierSource)] -.-> resolve
///     resolve --> group{{group by class}}
///     classes[(GeneMapper)] -.-> group
///     group --> stats{{count and test each class}}
///     names[(ClassNameMapper)] -.-> stats
///     stats --> correct{{multiple testing correction}}
///     correct --> sort{{sort by p-value}}
///     sort --> result[Enrichments]
/// ```
///
/// # Examples
///
/// ```
/// use integrator::mapper::{GeneSets, IdentifierTable, IdentifierTables};
/// use integrator::{EnricherBuilder, GeneId, GeneInput, IdentifierType, Species};
/// use std::sync::Arc;
///
/// let mut sets = GeneSets::new("Pathway enrichment", Some(Species::human()))
///     .with_genome_size(20_000);
/// sets.insert("path:hsa04115", "p53 signaling pathway", [7157u32, 1026, 4193].map(GeneId::from));
///
/// let mut symbols = IdentifierTable::new(IdentifierType::GeneSymbol, Some(Species::human()));
/// symbols.insert("TP53", GeneId::from(7157));
/// symbols.insert("CDKN1A", GeneId::from(1026));
/// let mut tables = IdentifierTables::new();
/// tables.insert(symbols);
///
/// let enricher = EnricherBuilder::new()
///     .kind(sets)
///     .identifiers(Arc::new(tables))
///     .build()
///     .unwrap();
/// assert_eq!(enricher.species(), Some(&Species::human()));
///
/// let genes: Vec<GeneInput<GeneId>> = ["TP53", "CDKN1A", "XYZ"].map(GeneInput::from).to_vec();
/// let result = enricher
///     .enrichments(&genes, Some(IdentifierType::GeneSymbol), None)
///     .unwrap();
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[0].enriched(), 2);
/// // the unknown symbol still counts for the size of the list
/// assert_eq!(result[0].list_size(), 3);
/// ```
#[derive(Clone)]
pub struct Enricher<K> {
    name: String,
    species: Option<Species>,
    gene_mapper: Arc<dyn GeneMapper<K>>,
    name_mapper: Option<Arc<dyn ClassNameMapper<K>>>,
    identifiers: Option<Arc<dyn IdentifierSource>>,
    config: EnrichmentConfig,
}

impl<K> std::fmt::Debug for Enricher<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher")
            .field("name", &self.name)
            .field("species", &self.species)
            .field("genome_size", &self.gene_mapper.genome_size())
            .field("name_mapper", &self.name_mapper.is_some())
            .field("identifiers", &self.identifiers.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<K> Enricher<K> {
    /// Builds an `Enricher` with the default mappers of `kind`
    ///
    /// # Errors
    ///
    /// If the mappers of `kind` can't be created or don't match the species
    pub fn from_kind<E>(kind: E, species: Option<Species>) -> IntegratorResult<Self>
    where
        E: EnrichmentKind<K> + 'static,
    {
        let builder = EnricherBuilder::new().kind(kind);
        match species {
            Some(species) => builder.species(species).build(),
            None => builder.build(),
        }
    }

    /// The human readable name of the analysis
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The species of the analysis, if known
    pub fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }

    /// The settings of the analysis
    pub fn config(&self) -> EnrichmentConfig {
        self.config
    }
}

impl<K> Enricher<K>
where
    K: Clone + Eq + Hash + Display,
{
    /// Runs the enrichment analysis of `genes`
    ///
    /// `id_type` is the type of all [`GeneInput::Identifier`]s in the list.
    /// They are parsed as [`GeneId`]s if `id_type` is `None` or
    /// [`IdentifierType::NcbiGeneId`].
    ///
    /// Genes that can't be mapped are skipped, but still count towards the
    /// size of the input list.
    ///
    /// Returns one [`Enrichment`] for every class with at least one gene of the
    /// list, sorted by p-value. The enrichments have q-values unless the
    /// correction is disabled in the [`EnrichmentConfig`].
    ///
    /// # Errors
    ///
    /// - [`IntegratorError::MapperUnavailable`] if `id_type` identifiers can't be mapped
    /// - [`IntegratorError::InvalidParameters`] if the list is larger than the genome
    pub fn enrichments<T>(
        &self,
        genes: &[GeneInput<T>],
        id_type: Option<IdentifierType>,
        mut progress: Option<&mut dyn ProgressReporter>,
    ) -> IntegratorResult<Vec<Enrichment<K, T>>>
    where
        T: HasGeneId + Clone + Eq + Hash,
    {
        let id_mapper = self.identifier_mapper(id_type)?;

        let mut order: Vec<K> = Vec::new();
        let mut groups: HashMap<K, HashSet<Member<T>>> = HashMap::new();
        for gene in genes {
            let (id, member) = match resolve(gene, id_mapper.as_deref()) {
                Some(resolved) => resolved,
                None => continue,
            };
            if !id.is_valid() {
                debug!("Skipping invalid gene id {}", id.as_u32());
                continue;
            }
            let classes = match self.gene_mapper.classes(id) {
                Ok(classes) => classes,
                Err(err) => {
                    warn!("Unable to get the enrichment classes of {}: {}", id, err);
                    continue;
                }
            };
            for class in classes {
                match groups.entry(class) {
                    Entry::Occupied(mut entry) => {
                        entry.get_mut().insert(member.clone());
                    }
                    Entry::Vacant(entry) => {
                        order.push(entry.key().clone());
                        entry.insert(HashSet::new()).insert(member.clone());
                    }
                }
            }
        }

        let list_size = u64_from_usize(genes.len());
        let genome_size = self.gene_mapper.genome_size();
        let calculator: Arc<dyn PvalueCalculator> =
            Arc::new(HypergeometricTest::new(genome_size, list_size).map_err(|err| {
                warn!("{}: {}", self.name, err);
                err
            })?);

        if let Some(progress) = progress.as_deref_mut() {
            progress.reset();
            progress.set_total_calls(order.len());
        }

        let mut results: Vec<Enrichment<K, T>> = Vec::with_capacity(order.len());
        for class in order {
            let members = groups.remove(&class).unwrap_or_default();
            let counts = Counts::new(
                u64_from_usize(members.len()),
                list_size,
                self.gene_mapper.class_size(&class),
                genome_size,
            );
            if !counts.is_consistent() {
                warn!("Inconsistent counts for {}: {:?}", class, counts);
            }
            let name = self.class_name(&class);
            let enrichment = Enrichment::new(class, &name, counts, members)
                .with_calculator(Arc::clone(&calculator));
            debug!(
                "{}: {}/{} genes, p = {:e}",
                enrichment.name(),
                counts.enriched,
                counts.class_size,
                enrichment.pvalue()
            );
            results.push(enrichment);
            if let Some(progress) = progress.as_deref_mut() {
                progress.advance();
            }
        }

        if !results.is_empty() {
            if let Some(correction) = self.config.correction {
                set_qvalues(&mut results, &correction);
            }
        }
        sort_by_pvalue(&mut results);

        info!(
            "{}: {} genes, {} enriched classes",
            self.name,
            genes.len(),
            results.len()
        );
        Ok(results)
    }

    /// Returns the name of the class or its identifier as fallback
    fn class_name(&self, class: &K) -> String {
        match &self.name_mapper {
            Some(mapper) if mapper.is_ready() => match mapper.name(class) {
                Ok(name) => name,
                Err(err) => {
                    warn!("No name for {}: {}", class, err);
                    class.to_string()
                }
            },
            Some(_) => {
                warn!("Class names are not ready, using the id of {}", class);
                class.to_string()
            }
            None => class.to_string(),
        }
    }
}

impl<K> Enricher<K> {
    /// Returns the identifier mapper for `id_type`
    ///
    /// Canonical gene ids need no mapper.
    fn identifier_mapper(
        &self,
        id_type: Option<IdentifierType>,
    ) -> IntegratorResult<Option<Arc<dyn IdentifierMapper>>> {
        let id_type = match id_type {
            Some(id_type) if !id_type.is_canonical() => id_type,
            _ => return Ok(None),
        };
        let mapper = match &self.identifiers {
            Some(source) => source.mapper(id_type, self.species.as_ref()),
            None => Err(IntegratorError::MapperUnavailable(id_type)),
        };
        match mapper {
            Ok(mapper) => Ok(Some(mapper)),
            Err(err) => {
                warn!("{}: unable to map {} identifiers: {}", self.name, id_type, err);
                Err(err)
            }
        }
    }
}

/// Returns the gene id of an input item and the member to report for it
fn resolve<T>(
    gene: &GeneInput<T>,
    id_mapper: Option<&dyn IdentifierMapper>,
) -> Option<(GeneId, Member<T>)>
where
    T: HasGeneId + Clone,
{
    match gene {
        GeneInput::Gene(id) => Some((*id, Member::Gene(*id))),
        GeneInput::Bundle(item) => match item.gene_id() {
            Some(id) => Some((id, Member::Bundle(item.clone()))),
            None => {
                debug!("Skipping input item without gene id");
                None
            }
        },
        GeneInput::Identifier(identifier) => {
            let id = match id_mapper {
                Some(mapper) => mapper.gene_id(identifier),
                None => GeneId::try_from(identifier.as_str()),
            };
            match id {
                Ok(id) => Some((id, Member::Gene(id))),
                Err(err) => {
                    warn!("Unable to map {}: {}", identifier, err);
                    None
                }
            }
        }
    }
}
