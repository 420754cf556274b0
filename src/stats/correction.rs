//! Correction of p-values for multiple testing
//!
//! Every enrichment analysis tests many classes at once. The q-values
//! produced here take the number of tests into account. A correction
//! always needs the p-values of all enrichments of an analysis, correcting
//! a subset gives meaningless q-values.
//!
//! # Examples
//!
//! ```
//! use integrator::stats::correction::{Correction, FdrCorrection};
//!
//! let pvalues = [0.04, 0.001, 0.02];
//!
//! let qvalues = FdrCorrection::BenjaminiHochberg.adjust(&pvalues);
//! assert!((qvalues[1] - 0.003).abs() < 1e-12);
//!
//! let qvalues = FdrCorrection::Bonferroni.adjust(&pvalues);
//! assert!((qvalues[0] - 0.12).abs() < 1e-12);
//! ```

use crate::stats::Enrichment;
use crate::{f64_from_u64, u64_from_usize};

/// Trait for multiple testing correction methods
///
/// `integrator` comes with the common methods of [`FdrCorrection`].
pub trait Correction {
    /// Returns the q-values of the `pvalues`, in the same order
    ///
    /// All q-values must be in the range `[0, 1]`.
    fn adjust(&self, pvalues: &[f64]) -> Vec<f64>;
}

/// Standard multiple testing corrections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FdrCorrection {
    /// False discovery rate of [Benjamini Y, Hochberg Y, J R Stat Soc B (1995)](https://doi.org/10.1111/j.2517-6161.1995.tb02031.x)
    BenjaminiHochberg,
    /// Family-wise error rate, multiplies every p-value with the number of tests
    Bonferroni,
    /// Step-down family-wise error rate of [Holm S, Scand J Stat (1979)](https://www.jstor.org/stable/4615733)
    BonferroniHolm,
}

impl Default for FdrCorrection {
    fn default() -> Self {
        Self::BenjaminiHochberg
    }
}

impl FdrCorrection {
    fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
        let order = ascending_order(pvalues);
        let total = tests(pvalues);
        let mut qvalues = vec![0.0; pvalues.len()];
        let mut running_min = 1.0f64;
        for (rank, idx) in order.iter().enumerate().rev() {
            let qvalue = pvalues[*idx] * total / f64_from_u64(u64_from_usize(rank + 1));
            running_min = running_min.min(qvalue);
            qvalues[*idx] = running_min.clamp(0.0, 1.0);
        }
        qvalues
    }

    fn bonferroni(pvalues: &[f64]) -> Vec<f64> {
        let total = tests(pvalues);
        pvalues
            .iter()
            .map(|pvalue| (pvalue * total).clamp(0.0, 1.0))
            .collect()
    }

    fn bonferroni_holm(pvalues: &[f64]) -> Vec<f64> {
        let order = ascending_order(pvalues);
        let total = pvalues.len();
        let mut qvalues = vec![0.0; total];
        let mut running_max = 0.0f64;
        for (rank, idx) in order.iter().enumerate() {
            let qvalue = pvalues[*idx] * f64_from_u64(u64_from_usize(total - rank));
            running_max = running_max.max(qvalue.min(1.0));
            qvalues[*idx] = running_max.clamp(0.0, 1.0);
        }
        qvalues
    }
}

impl Correction for FdrCorrection {
    fn adjust(&self, pvalues: &[f64]) -> Vec<f64> {
        match self {
            FdrCorrection::BenjaminiHochberg => Self::benjamini_hochberg(pvalues),
            FdrCorrection::Bonferroni => Self::bonferroni(pvalues),
            FdrCorrection::BonferroniHolm => Self::bonferroni_holm(pvalues),
        }
    }
}

/// Calculates the q-values of all enrichments and stores them in place
///
/// The enrichments must be the complete result of an analysis.
/// Missing p-values are calculated first.
pub fn set_qvalues<K, T, C>(enrichments: &mut [Enrichment<K, T>], correction: &C)
where
    C: Correction + ?Sized,
{
    let pvalues: Vec<f64> = enrichments
        .iter_mut()
        .map(Enrichment::cache_pvalue)
        .collect();
    let qvalues = correction.adjust(&pvalues);
    for (enrichment, qvalue) in enrichments.iter_mut().zip(qvalues) {
        enrichment.set_qvalue(qvalue);
    }
}

/// Indices of the p-values, sorted by ascending p-value
fn ascending_order(pvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|a, b| pvalues[*a].total_cmp(&pvalues[*b]));
    order
}

fn tests(pvalues: &[f64]) -> f64 {
    f64_from_u64(u64_from_usize(pvalues.len()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::genes::GeneId;
    use crate::stats::Counts;
    use std::collections::HashSet;

    const PVALUES: [f64; 6] = [0.01, 0.2, 0.001, 0.04, 0.04, 0.8];

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{x} != {y}");
        }
    }

    fn by_pvalue(pvalues: &[f64], qvalues: &[f64]) -> Vec<f64> {
        ascending_order(pvalues).iter().map(|idx| qvalues[*idx]).collect()
    }

    #[test]
    fn benjamini_hochberg_example() {
        let qvalues = FdrCorrection::BenjaminiHochberg.adjust(&[0.001, 0.02, 0.04]);
        assert_close(&qvalues, &[0.003, 0.03, 0.04]);
    }

    #[test]
    fn benjamini_hochberg() {
        let qvalues = FdrCorrection::BenjaminiHochberg.adjust(&PVALUES);
        // same as R: p.adjust(c(0.01, 0.2, 0.001, 0.04, 0.04, 0.8), "BH")
        assert_close(&qvalues, &[0.03, 0.24, 0.006, 0.06, 0.06, 0.8]);

        let sorted = by_pvalue(&PVALUES, &qvalues);
        for pair in sorted.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for (p, q) in PVALUES.iter().zip(&qvalues) {
            assert!(q >= p);
        }
    }

    #[test]
    fn bonferroni() {
        let qvalues = FdrCorrection::Bonferroni.adjust(&PVALUES);
        let expected: Vec<f64> = PVALUES.iter().map(|p| (p * 6.0).min(1.0)).collect();
        assert_close(&qvalues, &expected);
    }

    #[test]
    fn bonferroni_holm() {
        let qvalues = FdrCorrection::BonferroniHolm.adjust(&PVALUES);
        // same as R: p.adjust(c(0.01, 0.2, 0.001, 0.04, 0.04, 0.8), "holm")
        assert_close(&qvalues, &[0.05, 0.4, 0.006, 0.16, 0.16, 0.8]);

        let sorted = by_pvalue(&PVALUES, &qvalues);
        for pair in sorted.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn clamped_and_idempotent() {
        let pvalues = [0.9, 0.5, 0.7];
        for correction in [
            FdrCorrection::BenjaminiHochberg,
            FdrCorrection::Bonferroni,
            FdrCorrection::BonferroniHolm,
        ] {
            let qvalues = correction.adjust(&pvalues);
            assert!(qvalues.iter().all(|q| (0.0..=1.0).contains(q)));
            assert_close(&qvalues, &correction.adjust(&pvalues));
        }
    }

    #[test]
    fn empty() {
        assert!(FdrCorrection::BenjaminiHochberg.adjust(&[]).is_empty());
        assert!(FdrCorrection::BonferroniHolm.adjust(&[]).is_empty());
    }

    #[test]
    fn enrichments() {
        let member = |id: u32| -> HashSet<crate::genes::Member<GeneId>> {
            [crate::genes::Member::Gene(GeneId::from(id))].into_iter().collect()
        };
        let mut enrichments: Vec<Enrichment<&str, GeneId>> = vec![
            Enrichment::new("A", "a", Counts::new(1, 10, 20, 100), member(1)),
            Enrichment::new("B", "b", Counts::new(1, 10, 50, 100), member(2)),
        ];
        set_qvalues(&mut enrichments, &FdrCorrection::Bonferroni);
        for enrichment in &enrichments {
            let expected = (enrichment.pvalue() * 2.0).min(1.0);
            assert!((enrichment.qvalue().unwrap() - expected).abs() < 1e-12);
        }

        let dynamic: &dyn Correction = &FdrCorrection::BenjaminiHochberg;
        set_qvalues(&mut enrichments, dynamic);
        assert!(enrichments.iter().all(|e| e.qvalue().is_some()));
    }
}
