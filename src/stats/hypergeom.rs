//! The probability of an enrichment within the hypergeometric distribution
//!
//! An input list of `n` genes is drawn from a genome of `N` genes. An
//! enrichment class contains `K` genes of the genome, `k` of them are
//! part of the input list. The p-value is the probability to see `k` or more
//! class members in the list by chance.
//!
//! # Examples
//!
//! ```
//! use integrator::stats::hypergeom::{HypergeometricTest, PvalueCalculator};
//!
//! // 100 genes out of a genome of 20,000 genes,
//! // 10 of them are part of a pathway with 50 genes
//! let test = HypergeometricTest::new(20_000, 100).unwrap();
//! let pvalue = test.pvalue(50, 10);
//! assert!(pvalue < 1e-10);
//!
//! // finding no gene at all is always possible
//! assert!((test.pvalue(50, 0) - 1.0).abs() < f64::EPSILON);
//! ```

use core::fmt::Debug;
use std::cmp;

use statrs::function::factorial::ln_binomial;
use tracing::warn;

use crate::{IntegratorError, IntegratorResult};

/// Trait for p-value calculation of an enrichment class
///
/// A calculator is built for one combination of genome size and input list
/// size and can be shared by all enrichment classes of one analysis.
pub trait PvalueCalculator: Debug + Send + Sync {
    /// The number of genes in the genome (population)
    fn genome_size(&self) -> u64;

    /// The number of genes in the input list (draws)
    fn list_size(&self) -> u64;

    /// The probability to find `overlap` or more genes of a class with
    /// `class_size` genes in the input list
    fn pvalue(&self, class_size: u64, overlap: u64) -> f64;
}

/// One-sided hypergeometric test for over-representation
///
/// The binomial coefficient of genome size and list size is the same
/// for every enrichment class, it is calculated once on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypergeometricTest {
    genome_size: u64,
    list_size: u64,
    ln_denominator: f64,
}

impl HypergeometricTest {
    /// Constructs a new test for an input list of `list_size` genes
    /// from a genome of `genome_size` genes
    ///
    /// # Errors
    ///
    /// If the list is larger than the genome
    pub fn new(genome_size: u64, list_size: u64) -> IntegratorResult<Self> {
        if list_size > genome_size {
            return Err(IntegratorError::InvalidParameters(format!(
                "list of {list_size} genes is larger than the genome of {genome_size} genes"
            )));
        }
        Ok(Self {
            genome_size,
            list_size,
            ln_denominator: ln_binomial(genome_size, list_size),
        })
    }
}

impl PvalueCalculator for HypergeometricTest {
    fn genome_size(&self) -> u64 {
        self.genome_size
    }

    fn list_size(&self) -> u64 {
        self.list_size
    }

    /// Sums the probability mass function from `overlap` up to the
    /// largest possible overlap
    fn pvalue(&self, class_size: u64, overlap: u64) -> f64 {
        if overlap == 0 {
            return 1.0;
        }
        let successes = if class_size > self.genome_size {
            warn!(
                "Class of {} genes is larger than the genome of {} genes",
                class_size, self.genome_size
            );
            self.genome_size
        } else {
            class_size
        };

        let min = (self.list_size + successes).saturating_sub(self.genome_size);
        let max = cmp::min(successes, self.list_size);
        if overlap <= min {
            return 1.0;
        }
        if overlap > max {
            return 0.0;
        }

        let pvalue = (overlap..=max).fold(0.0, |acc, i| {
            acc + (ln_binomial(successes, i)
                + ln_binomial(self.genome_size - successes, self.list_size - i)
                - self.ln_denominator)
                .exp()
        });
        pvalue.clamp(0.0, 1.0)
    }
}
