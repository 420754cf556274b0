//! Combining the results of several enrichment analyses
//!
//! When the same set of enrichment classes is tested with gene lists of
//! several datasets, the enrichments of every class can be combined into one
//! aggregated result. Counts are reduced with a [`MergeType`] and the genes
//! of all datasets are combined. Genes that carry data, like
//! [`ExpressedGene`](crate::ExpressedGene)s, are merged themselves.
//!
//! Merged enrichments always lose their q-value. Run
//! [`set_qvalues`](crate::stats::correction::set_qvalues) on the complete
//! merged list to get new ones.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//! use integrator::stats::merge::merge_enrichments;
//! use integrator::stats::{Counts, Enrichment};
//! use integrator::{GeneId, Member, MergeType};
//!
//! let members = |ids: &[u32]| -> HashSet<Member<GeneId>> {
//!     ids.iter().map(|id| Member::Gene(GeneId::from(*id))).collect()
//! };
//!
//! let first = vec![
//!     Enrichment::new("path:1", "Glycolysis", Counts::new(2, 10, 20, 100), members(&[1, 2])),
//!     Enrichment::new("path:2", "Citrate cycle", Counts::new(1, 10, 30, 100), members(&[5])),
//! ];
//! let second = vec![
//!     Enrichment::new("path:1", "Glycolysis", Counts::new(4, 12, 20, 100), members(&[2, 3, 4, 9])),
//! ];
//!
//! let merged = merge_enrichments(first.into_iter().chain(second), MergeType::Mean);
//! assert_eq!(merged.len(), 2);
//! assert_eq!(merged[0].enriched(), 3);
//! assert_eq!(merged[0].list_size(), 11);
//! assert_eq!(merged[0].members().len(), 5);
//! assert!(merged[0].qvalue().is_none());
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::{debug, warn};

use crate::genes::Member;
use crate::stats::{Counts, Enrichment};
use crate::{f64_from_u64, u64_from_usize, IntegratorError, IntegratorResult};

/// Reduction of several values into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeType {
    /// Arithmetic mean
    Mean,
    /// Median, the mean of the two central values for an even number of values
    Median,
    /// Smallest value
    Minimum,
    /// Largest value
    Maximum,
    /// Sum of all values
    Sum,
}

impl Default for MergeType {
    fn default() -> Self {
        Self::Mean
    }
}

impl MergeType {
    /// Reduces `values` into a single value
    ///
    /// Returns `NaN` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrator::MergeType;
    ///
    /// let values = [4.0, 1.0, 2.0, 8.0];
    /// assert!((MergeType::Mean.calculate(&values) - 3.75).abs() < f64::EPSILON);
    /// assert!((MergeType::Median.calculate(&values) - 3.0).abs() < f64::EPSILON);
    /// assert!((MergeType::Maximum.calculate(&values) - 8.0).abs() < f64::EPSILON);
    /// assert!(MergeType::Sum.calculate(&[]).is_nan());
    /// ```
    pub fn calculate(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            MergeType::Mean => {
                values.iter().sum::<f64>() / f64_from_u64(u64_from_usize(values.len()))
            }
            MergeType::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
            MergeType::Minimum => values.iter().copied().fold(f64::INFINITY, f64::min),
            MergeType::Maximum => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            MergeType::Sum => values.iter().sum(),
        }
    }

    fn reduce_counts(&self, counts: &[u64]) -> u64 {
        let values: Vec<f64> = counts.iter().map(|count| f64_from_u64(*count)).collect();
        u64_from_f64(self.calculate(&values).round())
    }
}

/// Trait for gene objects that can be combined into one object
///
/// Objects with the same [`Mergeable::merge_key`] describe the same gene
/// in different datasets.
pub trait Mergeable: Sized {
    /// Identifies objects that belong together
    type Key: Hash + Eq;

    /// Returns the key of the object
    fn merge_key(&self) -> Self::Key;

    /// Combines a group of objects with the same key into a single one
    ///
    /// Returns `None` if `group` is empty.
    fn merge(group: &[Self], how: MergeType) -> Option<Self>;
}

impl<K, T> Enrichment<K, T>
where
    K: Clone + PartialEq,
    T: Mergeable + Clone + Eq + Hash,
{
    /// Combines enrichments of the same class from several analyses
    ///
    /// All counts are reduced with `how` and rounded to the nearest integer.
    /// The members of all sources are combined. If the members are
    /// [`Member::Bundle`]s, bundles with the same key are merged with `how`.
    ///
    /// The id and name are taken from the first source. The merged enrichment
    /// has no q-value, its p-value is calculated from the merged counts.
    ///
    /// # Errors
    ///
    /// [`IntegratorError::EmptyMerge`] if `sources` is empty
    pub fn merge(sources: &[Enrichment<K, T>], how: MergeType) -> IntegratorResult<Self> {
        let first = sources.first().ok_or(IntegratorError::EmptyMerge)?;
        if sources.iter().any(|source| source.id() != first.id()) {
            warn!("Merging enrichments of different classes into {}", first.name());
        }

        let reduce = |field: fn(&Counts) -> u64| -> u64 {
            let counts: Vec<u64> = sources.iter().map(|source| field(&source.counts)).collect();
            how.reduce_counts(&counts)
        };
        let counts = Counts::new(
            reduce(|c| c.enriched),
            reduce(|c| c.list_size),
            reduce(|c| c.class_size),
            reduce(|c| c.genome_size),
        );

        let members: HashSet<Member<T>> = sources
            .iter()
            .flat_map(|source| source.members().iter().cloned())
            .collect();
        let members = if contains_bundles(sources) {
            merge_members(members, how)
        } else {
            members
        };

        let mut merged = Enrichment::new(first.id().clone(), first.name(), counts, members);
        merged.unset_statistics();
        merged.init_default_calculator();
        debug!(
            "Merged {} enrichments of {} into {}/{}",
            sources.len(),
            merged.name(),
            merged.enriched(),
            merged.list_size()
        );
        Ok(merged)
    }
}

/// Merges all enrichments with the same class id
///
/// The classes are returned in the order of their first occurrence.
/// Merged enrichments have no q-value.
pub fn merge_enrichments<K, T, I>(enrichments: I, how: MergeType) -> Vec<Enrichment<K, T>>
where
    I: IntoIterator<Item = Enrichment<K, T>>,
    K: Clone + Eq + Hash,
    T: Mergeable + Clone + Eq + Hash,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, Vec<Enrichment<K, T>>> = HashMap::new();
    for enrichment in enrichments {
        let group = groups.entry(enrichment.id().clone()).or_insert_with(|| {
            order.push(enrichment.id().clone());
            Vec::new()
        });
        group.push(enrichment);
    }

    order
        .iter()
        .filter_map(|id| groups.get(id))
        .filter_map(|group| Enrichment::merge(group, how).ok())
        .collect()
}

/// Checks the first source with any members, bare gene ids are never merged
fn contains_bundles<K, T>(sources: &[Enrichment<K, T>]) -> bool {
    sources
        .iter()
        .find(|source| !source.members().is_empty())
        .map_or(false, |source| {
            source.members().iter().any(Member::is_bundle)
        })
}

fn merge_members<T>(members: HashSet<Member<T>>, how: MergeType) -> HashSet<Member<T>>
where
    T: Mergeable + Clone + Eq + Hash,
{
    let mut merged: HashSet<Member<T>> = HashSet::with_capacity(members.len());
    let mut groups: HashMap<T::Key, Vec<T>> = HashMap::new();
    for member in members {
        match member {
            Member::Bundle(bundle) => groups.entry(bundle.merge_key()).or_default().push(bundle),
            Member::Gene(id) => {
                merged.insert(Member::Gene(id));
            }
        }
    }
    merged.extend(
        groups
            .values()
            .filter_map(|group| T::merge(group, how))
            .map(Member::Bundle),
    );
    merged
}

/// Merged counts are rounded and never negative
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn u64_from_f64(n: f64) -> u64 {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    n as u64
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::genes::{ExpressedGene, GeneId};
    use crate::stats::hypergeom::{HypergeometricTest, PvalueCalculator};

    fn members(ids: &[u32]) -> HashSet<Member<GeneId>> {
        ids.iter().map(|id| Member::Gene(GeneId::from(*id))).collect()
    }

    fn expressed(values: &[(u32, f64)]) -> HashSet<Member<ExpressedGene>> {
        values
            .iter()
            .map(|(id, value)| {
                Member::Bundle(ExpressedGene::new(GeneId::from(*id), &format!("G{id}"), *value))
            })
            .collect()
    }

    #[test]
    fn merge_types() {
        let values = [3.0, 1.0, 2.0];
        assert!((MergeType::Mean.calculate(&values) - 2.0).abs() < f64::EPSILON);
        assert!((MergeType::Median.calculate(&values) - 2.0).abs() < f64::EPSILON);
        assert!((MergeType::Minimum.calculate(&values) - 1.0).abs() < f64::EPSILON);
        assert!((MergeType::Maximum.calculate(&values) - 3.0).abs() < f64::EPSILON);
        assert!((MergeType::Sum.calculate(&values) - 6.0).abs() < f64::EPSILON);
        assert!(MergeType::Median.calculate(&[]).is_nan());
        assert_eq!(MergeType::default(), MergeType::Mean);
    }

    #[test]
    fn rounded_counts() {
        assert_eq!(MergeType::Mean.reduce_counts(&[2, 4]), 3);
        assert_eq!(MergeType::Mean.reduce_counts(&[2, 3]), 3);
        assert_eq!(MergeType::Mean.reduce_counts(&[1, 1, 2]), 1);
        assert_eq!(MergeType::Sum.reduce_counts(&[]), 0);
    }

    #[test]
    fn single_source() {
        let mut source: Enrichment<&str, GeneId> =
            Enrichment::new("A", "a", Counts::new(3, 10, 20, 100), members(&[1, 2, 3]));
        let pvalue = source.cache_pvalue();
        source.set_qvalue(0.01);

        let merged = Enrichment::merge(&[source], MergeType::Median).unwrap();
        assert_eq!(merged.counts(), Counts::new(3, 10, 20, 100));
        assert_eq!(merged.members(), &members(&[1, 2, 3]));
        assert!((merged.pvalue() - pvalue).abs() < f64::EPSILON);
        assert!(merged.qvalue().is_none());
    }

    #[test]
    fn mean_of_counts() {
        let sources: Vec<Enrichment<&str, GeneId>> = vec![
            Enrichment::new("A", "a", Counts::new(2, 10, 20, 100), members(&[1, 2])),
            Enrichment::new("A", "a", Counts::new(4, 14, 20, 100), members(&[2, 3, 4, 5])),
        ];
        let merged = Enrichment::merge(&sources, MergeType::Mean).unwrap();
        assert_eq!(merged.enriched(), 3);
        assert_eq!(merged.list_size(), 12);
        assert_eq!(merged.members(), &members(&[1, 2, 3, 4, 5]));

        let calculator = merged.calculator().unwrap();
        assert_eq!(calculator.list_size(), 12);
        let expected = HypergeometricTest::new(100, 12).unwrap().pvalue(20, 3);
        assert!((merged.pvalue() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn qvalue_is_discarded() {
        let mut sources: Vec<Enrichment<&str, GeneId>> = vec![
            Enrichment::new("A", "a", Counts::new(2, 10, 20, 100), members(&[1, 2])),
            Enrichment::new("A", "a", Counts::new(2, 10, 20, 100), members(&[1, 2])),
        ];
        for source in &mut sources {
            source.set_qvalue(0.05);
        }
        let merged = Enrichment::merge(&sources, MergeType::Maximum).unwrap();
        assert!(merged.qvalue().is_none());
    }

    #[test]
    fn empty_merge() {
        let sources: Vec<Enrichment<&str, GeneId>> = Vec::new();
        assert_eq!(
            Enrichment::merge(&sources, MergeType::Mean).unwrap_err(),
            IntegratorError::EmptyMerge
        );
    }

    #[test]
    fn expressed_members_are_merged() {
        let sources: Vec<Enrichment<&str, ExpressedGene>> = vec![
            Enrichment::new("A", "a", Counts::new(0, 10, 20, 100), HashSet::new()),
            Enrichment::new(
                "A",
                "a",
                Counts::new(2, 10, 20, 100),
                expressed(&[(1, 1.0), (2, 4.0)]),
            ),
            Enrichment::new(
                "A",
                "a",
                Counts::new(1, 10, 20, 100),
                expressed(&[(1, 3.0)]),
            ),
        ];
        let merged = Enrichment::merge(&sources, MergeType::Mean).unwrap();
        assert_eq!(merged.members().len(), 2);
        for member in merged.members() {
            let gene = member.bundle().unwrap();
            match gene.id().as_u32() {
                1 => assert!((gene.value() - 2.0).abs() < f64::EPSILON),
                2 => assert!((gene.value() - 4.0).abs() < f64::EPSILON),
                other => panic!("unexpected gene {other}"),
            }
        }
    }

    #[test]
    fn merge_by_class() {
        let enrichments: Vec<Enrichment<&str, GeneId>> = vec![
            Enrichment::new("B", "b", Counts::new(1, 10, 20, 100), members(&[1])),
            Enrichment::new("A", "a", Counts::new(2, 10, 20, 100), members(&[1, 2])),
            Enrichment::new("B", "b", Counts::new(3, 10, 20, 100), members(&[1, 2, 3])),
        ];
        let merged = merge_enrichments(enrichments, MergeType::Sum);
        let ids: Vec<&str> = merged.iter().map(|e| *e.id()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(merged[0].enriched(), 4);
        assert_eq!(merged[0].list_size(), 20);
        assert_eq!(merged[1].enriched(), 2);
    }
}
