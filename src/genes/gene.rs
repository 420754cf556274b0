use core::fmt::Debug;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

use crate::genes::HasGeneId;
use crate::stats::merge::{MergeType, Mergeable};
use crate::{IntegratorError, IntegratorResult};

/// A canonical gene identifier, most likely the NCBI Gene ID
///
/// All other identifier types are mapped into this numeric space
/// before a gene can be assigned to any enrichment class.
/// The ID `0` is not a valid gene.
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    /// Returns the integer representation of the gene id
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    /// Returns `false` for placeholder ids that don't point to any gene
    pub fn is_valid(&self) -> bool {
        self.inner > 0
    }
}

impl TryFrom<&str> for GeneId {
    type Error = IntegratorError;
    fn try_from(value: &str) -> IntegratorResult<Self> {
        let value = value.trim();
        let value = value.strip_prefix("NCBI-GeneID:").unwrap_or(value);
        Ok(GeneId {
            inner: value.parse::<u32>()?,
        })
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NCBI-GeneID:{}", self.inner)
    }
}

impl HasGeneId for GeneId {
    fn gene_id(&self) -> Option<GeneId> {
        Some(*self)
    }
}

/// Bare gene ids carry no data, merging them keeps the id
impl Mergeable for GeneId {
    type Key = GeneId;

    fn merge_key(&self) -> Self::Key {
        *self
    }

    fn merge(group: &[Self], _how: MergeType) -> Option<Self> {
        group.first().copied()
    }
}

/// A gene with a measured expression value, e.g. a fold change
/// of an mRNA probe
///
/// Using `ExpressedGene`s instead of bare [`GeneId`]s as input of an
/// enrichment analysis keeps the measurement attached to the genes that
/// are reported for every enrichment class.
///
/// # Examples
///
/// ```
/// use integrator::{ExpressedGene, GeneId, MergeType, Mergeable};
///
/// let a = ExpressedGene::new(GeneId::from(7157), "TP53", 2.0);
/// let b = ExpressedGene::new(GeneId::from(7157), "TP53", 4.0);
///
/// let merged = ExpressedGene::merge(&[a, b], MergeType::Mean).unwrap();
/// assert_eq!(merged.symbol(), "TP53");
/// assert!((merged.value() - 3.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct ExpressedGene {
    id: GeneId,
    symbol: String,
    value: f64,
}

impl ExpressedGene {
    /// Creates a new `ExpressedGene`
    pub fn new(id: GeneId, symbol: &str, value: f64) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
            value,
        }
    }

    /// The [`GeneId`] of the gene
    pub fn id(&self) -> &GeneId {
        &self.id
    }

    /// The gene symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The measured value
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for ExpressedGene {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.symbol == other.symbol
            && self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for ExpressedGene {}

impl Hash for ExpressedGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.symbol.hash(state);
        self.value.to_bits().hash(state);
    }
}

impl Display for ExpressedGene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.value)
    }
}

impl HasGeneId for ExpressedGene {
    fn gene_id(&self) -> Option<GeneId> {
        Some(self.id)
    }
}

impl Mergeable for ExpressedGene {
    type Key = GeneId;

    fn merge_key(&self) -> Self::Key {
        self.id
    }

    fn merge(group: &[Self], how: MergeType) -> Option<Self> {
        let first = group.first()?;
        let values: Vec<f64> = group.iter().map(ExpressedGene::value).collect();
        Some(Self {
            id: first.id,
            symbol: first.symbol.clone(),
            value: how.calculate(&values),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parse_gene_id() {
        assert_eq!(GeneId::try_from("7157").unwrap(), GeneId::from(7157));
        assert_eq!(GeneId::try_from(" 672 ").unwrap(), GeneId::from(672));
        assert_eq!(
            GeneId::try_from("NCBI-GeneID:672").unwrap(),
            GeneId::from(672)
        );
        assert_eq!(
            GeneId::try_from("BRCA1"),
            Err(IntegratorError::ParseIntError)
        );
        assert!(GeneId::try_from("-1").is_err());
    }

    #[test]
    fn validity() {
        assert!(GeneId::from(1).is_valid());
        assert!(!GeneId::from(0).is_valid());
        assert!(!GeneId::default().is_valid());
    }

    #[test]
    fn expressed_gene_identity() {
        let a = ExpressedGene::new(GeneId::from(1), "A", 0.5);
        let b = ExpressedGene::new(GeneId::from(1), "A", 0.5);
        let c = ExpressedGene::new(GeneId::from(1), "A", 0.7);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<ExpressedGene> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn merge_expressed_genes() {
        let group = vec![
            ExpressedGene::new(GeneId::from(1), "A", 1.0),
            ExpressedGene::new(GeneId::from(1), "A", 5.0),
            ExpressedGene::new(GeneId::from(1), "A", 3.0),
        ];
        let max = ExpressedGene::merge(&group, MergeType::Maximum).unwrap();
        assert_eq!(max.id(), &GeneId::from(1));
        assert!((max.value() - 5.0).abs() < f64::EPSILON);

        let median = ExpressedGene::merge(&group, MergeType::Median).unwrap();
        assert!((median.value() - 3.0).abs() < f64::EPSILON);

        assert!(ExpressedGene::merge(&[], MergeType::Mean).is_none());
    }

    #[test]
    fn merge_gene_ids() {
        let ids = [GeneId::from(4), GeneId::from(4)];
        assert_eq!(GeneId::merge(&ids, MergeType::Sum), Some(GeneId::from(4)));
    }
}
