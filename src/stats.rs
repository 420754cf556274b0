//! Statistical results of an enrichment analysis
//!
//! Every enrichment class that contains at least one gene of the input list
//! is reported as an [`Enrichment`]. It holds the counts that describe the
//! overlap of the input list with the class, the genes that make up the
//! overlap, the p-value of the overlap and, after a multiple testing
//! correction of all classes, a q-value.
//!
//! - [`hypergeom`] calculates the p-values
//! - [`correction`] adjusts p-values for multiple testing
//! - [`merge`] combines the results of several analyses

use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::f64_from_u64;
use crate::genes::Member;

pub mod correction;
pub mod hypergeom;
pub mod merge;

use hypergeom::{HypergeometricTest, PvalueCalculator};

/// The four numbers that describe the overlap of an input list with an enrichment class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Counts {
    /// Genes of the input list that are part of the class
    pub enriched: u64,
    /// Total number of genes in the input list
    pub list_size: u64,
    /// Total number of genes of the class in the genome
    pub class_size: u64,
    /// Total number of genes in the genome
    pub genome_size: u64,
}

impl Counts {
    /// Constructs new `Counts`
    pub fn new(enriched: u64, list_size: u64, class_size: u64, genome_size: u64) -> Self {
        Self {
            enriched,
            list_size,
            class_size,
            genome_size,
        }
    }

    /// Returns `false` if the counts can't describe a real overlap, e.g.
    /// when more genes of a class were found than the class contains
    pub fn is_consistent(&self) -> bool {
        self.enriched <= self.list_size
            && self.enriched <= self.class_size
            && self.class_size <= self.genome_size
            && self.list_size <= self.genome_size
    }
}

/// A fraction of two counts, e.g. `10/100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    numerator: u64,
    denominator: u64,
}

impl Ratio {
    /// Constructs a new `Ratio`
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The numerator
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    /// The denominator
    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// The fraction as float, `NaN` if the denominator is `0`
    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            return f64::NAN;
        }
        f64_from_u64(self.numerator) / f64_from_u64(self.denominator)
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// The enrichment of a single class (pathway, GO term...) in an input gene list
///
/// `Enrichment`s are returned from [`Enricher::enrichments`](crate::Enricher::enrichments)
/// and [`Enrichment::merge`].
///
/// The p-value is calculated by a [`PvalueCalculator`] that must match the
/// list and genome size of the enrichment. It is cached once calculated.
/// If no calculator is set, a [`HypergeometricTest`] is used.
///
/// The q-value is only known after all enrichments of an analysis were
/// corrected for multiple testing, see [`correction::set_qvalues`].
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use integrator::stats::{Counts, Enrichment};
/// use integrator::{GeneId, Member};
///
/// let members: HashSet<Member<GeneId>> = [Member::Gene(GeneId::from(1))].into_iter().collect();
/// let enrichment = Enrichment::new("path:1", "Glycolysis", Counts::new(1, 10, 5, 100), members);
///
/// assert_eq!(enrichment.list_ratio().to_string(), "1/10");
/// assert!(enrichment.pvalue() > 0.0);
/// assert!(enrichment.qvalue().is_none());
/// assert!((enrichment.enrichment() - 2.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct Enrichment<K, T> {
    id: K,
    name: String,
    counts: Counts,
    members: HashSet<Member<T>>,
    calculator: Option<Arc<dyn PvalueCalculator>>,
    pvalue: Option<f64>,
    qvalue: Option<f64>,
}

impl<K, T> Enrichment<K, T> {
    /// Constructs a new `Enrichment` without a p-value calculator
    ///
    /// A [`HypergeometricTest`] will be created for the p-value calculation.
    /// Use [`Enrichment::with_calculator`] to share one calculator between
    /// many enrichments.
    pub fn new(id: K, name: &str, counts: Counts, members: HashSet<Member<T>>) -> Self {
        Self {
            id,
            name: name.to_string(),
            counts,
            members,
            calculator: None,
            pvalue: None,
            qvalue: None,
        }
    }

    /// Sets the p-value calculator, see [`Enrichment::set_calculator`]
    #[must_use]
    pub fn with_calculator(mut self, calculator: Arc<dyn PvalueCalculator>) -> Self {
        self.set_calculator(calculator);
        self
    }

    /// The identifier of the enrichment class
    pub fn id(&self) -> &K {
        &self.id
    }

    /// The human readable name of the enrichment class
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All counts of the enrichment
    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// The number of genes of the input list in this class
    pub fn enriched(&self) -> u64 {
        self.counts.enriched
    }

    /// The number of genes in the input list
    pub fn list_size(&self) -> u64 {
        self.counts.list_size
    }

    /// The number of genes of this class in the genome
    pub fn class_size(&self) -> u64 {
        self.counts.class_size
    }

    /// The number of genes in the genome
    pub fn genome_size(&self) -> u64 {
        self.counts.genome_size
    }

    /// The genes of the input list that are part of this class
    pub fn members(&self) -> &HashSet<Member<T>> {
        &self.members
    }

    /// Enriched genes over the size of the input list
    pub fn list_ratio(&self) -> Ratio {
        Ratio::new(self.counts.enriched, self.counts.list_size)
    }

    /// Class size over genome size
    pub fn genome_ratio(&self) -> Ratio {
        Ratio::new(self.counts.class_size, self.counts.genome_size)
    }

    /// Returns the fold enrichment over the background population
    pub fn enrichment(&self) -> f64 {
        self.list_ratio().as_f64() / self.genome_ratio().as_f64()
    }

    /// The calculator used for the p-value
    pub fn calculator(&self) -> Option<&Arc<dyn PvalueCalculator>> {
        self.calculator.as_ref()
    }

    /// Sets a new p-value calculator and re-calculates the p-value
    ///
    /// The calculator must be built for the same list size and genome size as
    /// the enrichment. Otherwise it is rejected, the previous calculator is kept
    /// and `false` is returned.
    pub fn set_calculator(&mut self, calculator: Arc<dyn PvalueCalculator>) -> bool {
        if calculator.list_size() != self.counts.list_size
            || calculator.genome_size() != self.counts.genome_size
        {
            warn!(
                "Rejected p-value calculator for {} genes of {}, the enrichment has {} genes of {}",
                calculator.list_size(),
                calculator.genome_size(),
                self.counts.list_size,
                self.counts.genome_size
            );
            return false;
        }
        let unchanged = self
            .calculator
            .as_ref()
            .map_or(false, |current| same_calculator(current, &calculator));
        if !unchanged {
            self.calculator = Some(calculator);
            self.pvalue = None;
            self.cache_pvalue();
        }
        true
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value indicates the probability that the enrichment
    /// occured by chance. It is `NaN` if the list or the genome are empty.
    ///
    /// If the p-value is not cached, it is calculated on the fly.
    /// Use [`Enrichment::cache_pvalue`] to store it.
    pub fn pvalue(&self) -> f64 {
        self.pvalue.unwrap_or_else(|| self.calculate_pvalue())
    }

    /// Calculates and stores the p-value, if it is not known already
    ///
    /// Creates a default calculator, if the enrichment has none.
    pub fn cache_pvalue(&mut self) -> f64 {
        if let Some(pvalue) = self.pvalue {
            return pvalue;
        }
        if self.calculator.is_none() {
            self.init_default_calculator();
        }
        let pvalue = self.calculate_pvalue();
        if !pvalue.is_nan() {
            self.pvalue = Some(pvalue);
        }
        pvalue
    }

    /// Returns the q-value, if the enrichment was corrected for multiple testing
    pub fn qvalue(&self) -> Option<f64> {
        self.qvalue
    }

    /// Sets the q-value
    ///
    /// Q-values depend on all enrichments of an analysis. Use
    /// [`correction::set_qvalues`] instead of setting them individually.
    pub fn set_qvalue(&mut self, qvalue: f64) {
        self.qvalue = Some(qvalue);
    }

    pub(crate) fn unset_statistics(&mut self) {
        self.pvalue = None;
        self.qvalue = None;
        self.calculator = None;
    }

    fn calculate_pvalue(&self) -> f64 {
        match &self.calculator {
            Some(calculator) => calculator.pvalue(self.counts.class_size, self.counts.enriched),
            None => self
                .default_calculator()
                .map_or(f64::NAN, |calculator| {
                    calculator.pvalue(self.counts.class_size, self.counts.enriched)
                }),
        }
    }

    fn init_default_calculator(&mut self) {
        if let Some(calculator) = self.default_calculator() {
            self.calculator = Some(Arc::new(calculator));
        }
    }

    fn default_calculator(&self) -> Option<HypergeometricTest> {
        if self.counts.genome_size == 0 || self.counts.list_size == 0 {
            return None;
        }
        match HypergeometricTest::new(self.counts.genome_size, self.counts.list_size) {
            Ok(calculator) => Some(calculator),
            Err(err) => {
                debug!("No default p-value calculator: {}", err);
                None
            }
        }
    }
}

impl<K: Display, T> Display for Enrichment<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{:e}\t",
            self.id,
            self.name,
            self.list_ratio(),
            self.genome_ratio(),
            self.pvalue()
        )?;
        match self.qvalue {
            Some(qvalue) => write!(f, "{qvalue:e}"),
            None => write!(f, "NaN"),
        }
    }
}

/// Sorts enrichments by ascending p-value
///
/// The sort is stable, enrichments with equal p-values keep their order.
pub fn sort_by_pvalue<K, T>(enrichments: &mut [Enrichment<K, T>]) {
    for enrichment in enrichments.iter_mut() {
        enrichment.cache_pvalue();
    }
    enrichments.sort_by(|a, b| a.pvalue().total_cmp(&b.pvalue()));
}

/// Compares the data pointers only
fn same_calculator(a: &Arc<dyn PvalueCalculator>, b: &Arc<dyn PvalueCalculator>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}
