use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::genes::{GeneId, IdentifierType, Species};
use crate::mapper::{IdentifierMapper, IdentifierSource};
use crate::{IntegratorError, IntegratorResult};

/// A lookup table from identifiers of one [`IdentifierType`] to [`GeneId`]s
///
/// Lookups ignore surrounding whitespace and letter case.
///
/// # Examples
///
/// ```
/// use integrator::mapper::{IdentifierMapper, IdentifierTable};
/// use integrator::{GeneId, IdentifierType};
///
/// let mut table = IdentifierTable::new(IdentifierType::GeneSymbol, None);
/// table.insert("TP53", GeneId::from(7157));
///
/// assert_eq!(table.gene_id("tp53").unwrap(), GeneId::from(7157));
/// assert!(table.gene_id("BRCA1").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierTable {
    id_type: IdentifierType,
    species: Option<Species>,
    entries: HashMap<String, GeneId>,
}

impl IdentifierTable {
    /// Creates an empty table
    pub fn new(id_type: IdentifierType, species: Option<Species>) -> Self {
        Self {
            id_type,
            species,
            entries: HashMap::new(),
        }
    }

    /// Adds an identifier to the table
    ///
    /// Returns the previous [`GeneId`] of the identifier, if it was present
    pub fn insert(&mut self, identifier: &str, gene: GeneId) -> Option<GeneId> {
        self.entries.insert(normalize(identifier), gene)
    }

    /// The type of identifiers in this table
    pub fn id_type(&self) -> IdentifierType {
        self.id_type
    }

    /// The species the identifiers belong to
    pub fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }

    /// The number of identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table contains no identifiers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches_species(&self, species: Option<&Species>) -> bool {
        match (self.species.as_ref(), species) {
            (Some(own), Some(requested)) => own == requested,
            _ => true,
        }
    }
}

impl IdentifierMapper for IdentifierTable {
    fn gene_id(&self, identifier: &str) -> IntegratorResult<GeneId> {
        self.entries
            .get(&normalize(identifier))
            .copied()
            .ok_or_else(|| IntegratorError::NotMapped(identifier.to_string()))
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_ascii_uppercase()
}

/// A collection of [`IdentifierTable`]s for different identifier types and species
#[derive(Debug, Clone, Default)]
pub struct IdentifierTables {
    tables: HashMap<IdentifierType, Vec<Arc<IdentifierTable>>>,
}

impl IdentifierTables {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the collection
    pub fn insert(&mut self, table: IdentifierTable) {
        self.tables
            .entry(table.id_type())
            .or_default()
            .push(Arc::new(table));
    }

    /// The number of tables
    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Returns `true` if the collection contains no tables
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentifierSource for IdentifierTables {
    fn mapper(
        &self,
        id_type: IdentifierType,
        species: Option<&Species>,
    ) -> IntegratorResult<Arc<dyn IdentifierMapper>> {
        let table = self
            .tables
            .get(&id_type)
            .and_then(|tables| tables.iter().find(|table| table.matches_species(species)))
            .ok_or(IntegratorError::MapperUnavailable(id_type))?;
        debug!("Using {} identifiers of {} entries", id_type, table.len());
        Ok(table.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn symbols(species: Species) -> IdentifierTable {
        let mut table = IdentifierTable::new(IdentifierType::GeneSymbol, Some(species));
        table.insert("TP53", GeneId::from(7157));
        table.insert("BRCA1", GeneId::from(672));
        table
    }

    #[test]
    fn lookup() {
        let table = symbols(Species::human());
        assert_eq!(table.len(), 2);
        assert_eq!(table.gene_id(" brca1 ").unwrap(), GeneId::from(672));
        assert_eq!(
            table.gene_id("KRAS"),
            Err(IntegratorError::NotMapped("KRAS".to_string()))
        );
    }

    #[test]
    fn replace_entry() {
        let mut table = symbols(Species::human());
        assert_eq!(table.insert("tp53", GeneId::from(1)), Some(GeneId::from(7157)));
        assert_eq!(table.gene_id("TP53").unwrap(), GeneId::from(1));
    }

    #[test]
    fn source_by_type_and_species() {
        let mut tables = IdentifierTables::new();
        assert!(tables.is_empty());
        tables.insert(symbols(Species::human()));

        let mut mouse = IdentifierTable::new(IdentifierType::GeneSymbol, Some(Species::mouse()));
        mouse.insert("Trp53", GeneId::from(22059));
        tables.insert(mouse);
        assert_eq!(tables.len(), 2);

        let mapper = tables
            .mapper(IdentifierType::GeneSymbol, Some(&Species::mouse()))
            .unwrap();
        assert_eq!(mapper.gene_id("TRP53").unwrap(), GeneId::from(22059));

        let mapper = tables
            .mapper(IdentifierType::GeneSymbol, Some(&Species::human()))
            .unwrap();
        assert_eq!(mapper.gene_id("TP53").unwrap(), GeneId::from(7157));

        assert!(matches!(
            tables.mapper(IdentifierType::GeneSymbol, Some(&Species::rat())),
            Err(IntegratorError::MapperUnavailable(IdentifierType::GeneSymbol))
        ));
        assert!(matches!(
            tables.mapper(IdentifierType::Ensembl, None),
            Err(IntegratorError::MapperUnavailable(IdentifierType::Ensembl))
        ));
    }
}
