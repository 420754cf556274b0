use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::enrichment::EnrichmentKind;
use crate::genes::{GeneId, Species};
use crate::mapper::{ClassNameMapper, GeneMapper};
use crate::{u64_from_usize, IntegratorError, IntegratorResult};

/// Most genes are part of only a handful of classes
const DEFAULT_NUM_CLASSES: usize = 8;

/// An in-memory collection of named gene sets
///
/// `GeneSets` can be used as [`GeneMapper`] and [`ClassNameMapper`] at the
/// same time and, as an [`EnrichmentKind`], provides both mappers to an
/// [`Enricher`](crate::Enricher).
///
/// The genome size defaults to the number of distinct genes in all sets.
/// Use [`GeneSets::with_genome_size`] if the background is larger, e.g. all
/// protein coding genes.
///
/// # Examples
///
/// ```
/// use integrator::mapper::{GeneMapper, GeneSets};
/// use integrator::{GeneId, Species};
///
/// let mut sets = GeneSets::new("KEGG pathway enrichment", Some(Species::human()));
/// sets.insert("path:hsa00010", "Glycolysis", [1u32, 2, 3].map(GeneId::from));
/// sets.insert("path:hsa00020", "Citrate cycle", [3u32, 4].map(GeneId::from));
///
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets.genome_size(), 4);
/// assert_eq!(sets.class_size(&"path:hsa00010"), 3);
/// assert_eq!(sets.classes(GeneId::from(3)).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GeneSets<K> {
    label: String,
    species: Option<Species>,
    genome_size: Option<u64>,
    names: HashMap<K, String>,
    members: HashMap<K, HashSet<GeneId>>,
    classes: HashMap<GeneId, SmallVec<[K; DEFAULT_NUM_CLASSES]>>,
}

impl<K: Clone + Eq + Hash> GeneSets<K> {
    /// Creates an empty collection
    ///
    /// `label` is the human readable name of the enrichment analysis
    /// that uses the collection, e.g. `"GO enrichment"`.
    pub fn new(label: &str, species: Option<Species>) -> Self {
        Self {
            label: label.to_string(),
            species,
            genome_size: None,
            names: HashMap::new(),
            members: HashMap::new(),
            classes: HashMap::new(),
        }
    }

    /// Sets a fixed genome size instead of counting the annotated genes
    #[must_use]
    pub fn with_genome_size(mut self, genome_size: u64) -> Self {
        self.genome_size = Some(genome_size);
        self
    }

    /// Adds the genes to the enrichment class
    ///
    /// If the class exists already, its name is replaced and the genes
    /// are added to the existing ones. Invalid gene ids are ignored.
    ///
    /// Returns the number of genes that were newly added to the class
    pub fn insert<I: IntoIterator<Item = GeneId>>(&mut self, class: K, name: &str, genes: I) -> usize {
        self.names.insert(class.clone(), name.to_string());
        let members = self.members.entry(class.clone()).or_default();
        let mut added = 0;
        for gene in genes {
            if !gene.is_valid() {
                debug!("Ignoring invalid gene id in set {name}");
                continue;
            }
            if members.insert(gene) {
                self.classes.entry(gene).or_default().push(class.clone());
                added += 1;
            }
        }
        added
    }

    /// The human readable name of the enrichment analysis
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The number of enrichment classes
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the collection contains no classes
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the genes of an enrichment class
    pub fn members(&self, class: &K) -> Option<&HashSet<GeneId>> {
        self.members.get(class)
    }
}

impl<K> GeneMapper<K> for GeneSets<K>
where
    K: Clone + Eq + Hash + Send + Sync,
{
    fn classes(&self, gene: GeneId) -> IntegratorResult<Vec<K>> {
        Ok(self
            .classes
            .get(&gene)
            .map(|classes| classes.to_vec())
            .unwrap_or_default())
    }

    fn genome_size(&self) -> u64 {
        self.genome_size
            .unwrap_or_else(|| u64_from_usize(self.classes.len()))
    }

    fn class_size(&self, class: &K) -> u64 {
        self.members
            .get(class)
            .map_or(0, |members| u64_from_usize(members.len()))
    }

    fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }
}

impl<K> ClassNameMapper<K> for GeneSets<K>
where
    K: Clone + Eq + Hash + Display + Send + Sync,
{
    fn name(&self, class: &K) -> IntegratorResult<String> {
        self.names
            .get(class)
            .cloned()
            .ok_or_else(|| IntegratorError::NotMapped(class.to_string()))
    }

    fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }
}

impl<K> EnrichmentKind<K> for GeneSets<K>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
{
    fn name(&self) -> String {
        self.label.clone()
    }

    fn gene_mapper(&self, species: Option<&Species>) -> IntegratorResult<Arc<dyn GeneMapper<K>>> {
        self.check_species(species)?;
        Ok(Arc::new(self.clone()))
    }

    fn name_mapper(
        &self,
        species: Option<&Species>,
    ) -> IntegratorResult<Option<Arc<dyn ClassNameMapper<K>>>> {
        self.check_species(species)?;
        Ok(Some(Arc::new(self.clone())))
    }
}

impl<K> GeneSets<K> {
    fn check_species(&self, species: Option<&Species>) -> IntegratorResult<()> {
        match (self.species.as_ref(), species) {
            (Some(own), Some(requested)) if own != requested => Err(
                IntegratorError::SpeciesMismatch(own.to_string(), requested.to_string()),
            ),
            _ => Ok(()),
        }
    }
}
