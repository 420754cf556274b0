use std::sync::Arc;

use tracing::{debug, warn};

use crate::enrichment::{Enricher, EnrichmentConfig, EnrichmentKind};
use crate::genes::Species;
use crate::mapper::{ClassNameMapper, GeneMapper, IdentifierSource};
use crate::stats::correction::FdrCorrection;
use crate::{IntegratorError, IntegratorResult};

/// Builder for [`Enricher`]s
///
/// Mappers that are not set explicitly are taken from the
/// [`EnrichmentKind`]. All mappers must be built for the same species.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use integrator::mapper::GeneSets;
/// use integrator::{EnricherBuilder, FdrCorrection, GeneId, IntegratorError, Species};
///
/// let mut sets = GeneSets::new("Pathway enrichment", Some(Species::human()));
/// sets.insert("path:hsa00010", "Glycolysis", [1u32, 2, 3].map(GeneId::from));
///
/// let enricher = EnricherBuilder::new()
///     .kind(sets.clone())
///     .correction(Some(FdrCorrection::BonferroniHolm))
///     .build()
///     .unwrap();
/// assert_eq!(enricher.name(), "Pathway enrichment");
///
/// let mouse = EnricherBuilder::new()
///     .kind(sets)
///     .species(Species::mouse())
///     .build();
/// assert!(matches!(mouse, Err(IntegratorError::SpeciesMismatch(_, _))));
/// ```
pub struct EnricherBuilder<K> {
    name: Option<String>,
    kind: Option<Box<dyn EnrichmentKind<K>>>,
    gene_mapper: Option<Arc<dyn GeneMapper<K>>>,
    name_mapper: Option<Arc<dyn ClassNameMapper<K>>>,
    species: Option<Species>,
    identifiers: Option<Arc<dyn IdentifierSource>>,
    config: EnrichmentConfig,
}

impl<K> Default for EnricherBuilder<K> {
    fn default() -> Self {
        Self {
            name: None,
            kind: None,
            gene_mapper: None,
            name_mapper: None,
            species: None,
            identifiers: None,
            config: EnrichmentConfig::default(),
        }
    }
}

impl<K> EnricherBuilder<K> {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind of the analysis that provides default mappers and the name
    #[must_use]
    pub fn kind<E: EnrichmentKind<K> + 'static>(mut self, kind: E) -> Self {
        self.kind = Some(Box::new(kind));
        self
    }

    /// Overrides the name of the analysis
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the mapping from genes to enrichment classes
    #[must_use]
    pub fn gene_mapper(mut self, mapper: Arc<dyn GeneMapper<K>>) -> Self {
        self.gene_mapper = Some(mapper);
        self
    }

    /// Sets the mapping from enrichment classes to names
    #[must_use]
    pub fn name_mapper(mut self, mapper: Arc<dyn ClassNameMapper<K>>) -> Self {
        self.name_mapper = Some(mapper);
        self
    }

    /// Sets the species of the analysis
    #[must_use]
    pub fn species(mut self, species: Species) -> Self {
        self.species = Some(species);
        self
    }

    /// Sets the source of identifier mappers
    #[must_use]
    pub fn identifiers(mut self, source: Arc<dyn IdentifierSource>) -> Self {
        self.identifiers = Some(source);
        self
    }

    /// Sets the multiple testing correction, `None` disables the correction
    #[must_use]
    pub fn correction(mut self, correction: Option<FdrCorrection>) -> Self {
        self.config = self.config.with_correction(correction);
        self
    }

    /// Replaces all settings
    #[must_use]
    pub fn config(mut self, config: EnrichmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the [`Enricher`]
    ///
    /// # Errors
    ///
    /// - [`IntegratorError::MissingMapping`] if neither a gene mapper nor a kind was set
    /// - [`IntegratorError::SpeciesMismatch`] if the mappers are for different species
    /// - Any error of the kind when creating the default mappers
    pub fn build(self) -> IntegratorResult<Enricher<K>> {
        let gene_mapper = match (self.gene_mapper, &self.kind) {
            (Some(mapper), _) => mapper,
            (None, Some(kind)) => kind.gene_mapper(self.species.as_ref())?,
            (None, None) => return Err(IntegratorError::MissingMapping),
        };
        let name_mapper = match (self.name_mapper, &self.kind) {
            (Some(mapper), _) => Some(mapper),
            (None, Some(kind)) => kind.name_mapper(self.species.as_ref())?,
            (None, None) => None,
        };

        let species = common_species(&[
            self.species.as_ref(),
            gene_mapper.species(),
            name_mapper.as_ref().and_then(|mapper| mapper.species()),
        ])?;

        let name = self
            .name
            .or_else(|| self.kind.as_ref().map(|kind| kind.name()))
            .unwrap_or_else(|| String::from("Enrichment"));
        debug!("Built {} enricher", name);

        Ok(Enricher {
            name,
            species,
            gene_mapper,
            name_mapper,
            identifiers: self.identifiers,
            config: self.config,
        })
    }
}

/// Returns the only species of all known species
fn common_species(candidates: &[Option<&Species>]) -> IntegratorResult<Option<Species>> {
    let mut known = candidates.iter().flatten();
    let first = match known.next() {
        Some(species) => *species,
        None => return Ok(None),
    };
    for other in known {
        if *other != first {
            warn!("Mappers are for {} and {}", first, other);
            return Err(IntegratorError::SpeciesMismatch(
                first.to_string(),
                other.to_string(),
            ));
        }
    }
    Ok(Some(first.clone()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::genes::GeneId;
    use crate::mapper::GeneSets;

    fn sets(species: Option<Species>) -> GeneSets<&'static str> {
        let mut sets = GeneSets::new("Test enrichment", species);
        sets.insert("A", "Class A", [1u32, 2, 3].map(GeneId::from));
        sets
    }

    #[test]
    fn missing_mapping() {
        let builder: EnricherBuilder<&str> = EnricherBuilder::new();
        assert_eq!(builder.build().unwrap_err(), IntegratorError::MissingMapping);

        let names: Arc<dyn ClassNameMapper<&str>> = Arc::new(sets(None));
        assert_eq!(
            EnricherBuilder::new().name_mapper(names).build().unwrap_err(),
            IntegratorError::MissingMapping
        );
    }

    #[test]
    fn defaults_from_kind() {
        let enricher = EnricherBuilder::new().kind(sets(None)).build().unwrap();
        assert_eq!(enricher.name(), "Test enrichment");
        assert!(enricher.species().is_none());
        assert!(enricher.name_mapper.is_some());
        assert_eq!(enricher.config(), EnrichmentConfig::default());

        let enricher = EnricherBuilder::new()
            .kind(sets(None))
            .name("Custom")
            .species(Species::rat())
            .build()
            .unwrap();
        assert_eq!(enricher.name(), "Custom");
        assert_eq!(enricher.species(), Some(&Species::rat()));
    }

    #[test]
    fn species_from_mappers() {
        let enricher = EnricherBuilder::new()
            .kind(sets(Some(Species::mouse())))
            .build()
            .unwrap();
        assert_eq!(enricher.species(), Some(&Species::mouse()));

        let enricher = EnricherBuilder::new()
            .kind(sets(Some(Species::mouse())))
            .species(Species::mouse())
            .build()
            .unwrap();
        assert_eq!(enricher.species(), Some(&Species::mouse()));
    }

    #[test]
    fn species_mismatch() {
        assert_eq!(
            EnricherBuilder::new()
                .kind(sets(Some(Species::human())))
                .species(Species::mouse())
                .build()
                .unwrap_err(),
            IntegratorError::SpeciesMismatch("Homo sapiens".to_string(), "Mus musculus".to_string())
        );

        let genes: Arc<dyn GeneMapper<&str>> = Arc::new(sets(Some(Species::human())));
        let names: Arc<dyn ClassNameMapper<&str>> = Arc::new(sets(Some(Species::rat())));
        assert!(matches!(
            EnricherBuilder::new()
                .gene_mapper(genes)
                .name_mapper(names)
                .build(),
            Err(IntegratorError::SpeciesMismatch(_, _))
        ));
    }

    #[test]
    fn explicit_mappers_win() {
        let mut other = GeneSets::new("Other", None);
        other.insert("A", "Renamed A", [GeneId::from(1)]);
        let names: Arc<dyn ClassNameMapper<&str>> = Arc::new(other);

        let enricher = EnricherBuilder::new()
            .kind(sets(None))
            .name_mapper(names)
            .build()
            .unwrap();
        let genes = vec![crate::GeneInput::<GeneId>::from(GeneId::from(1))];
        let result = enricher.enrichments(&genes, None, None).unwrap();
        assert_eq!(result[0].name(), "Renamed A");
    }
}
