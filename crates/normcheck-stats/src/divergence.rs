//! Kullback-Leibler divergence between a histogram and a fitted normal
//!
//! The empirical distribution is the histogram's bin frequencies
//! `p_i = count_i / n`. The reference distribution evaluates the normal density
//! at each bin center, `q_i = pdf(center_i) * bin_width`, and re-normalizes so
//! that `sum(q_i) = 1`. The divergence is
//!
//! ```text
//! KL(P || Q) = sum over i with p_i > 0 and q_i > 0 of p_i * ln(p_i / q_i)
//! ```
//!
//! measured in nats and clamped at zero.
//!
//! Bins where the empirical mass is positive but the reference mass underflows
//! to zero would make the textbook divergence infinite. This estimator skips
//! those terms (and any other non-finite term) instead, so the reported score is
//! a lower bound of the true divergence in that situation.
//!
//! A single-point histogram or a reference that collapses to zero total mass
//! yields [`KlDivergence::Undefined`].

use serde::{Deserialize, Serialize};

use crate::{histogram::Histogram, normal::NormalDistribution};

/// Result of a KL divergence estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "score")]
pub enum KlDivergence {
    /// A finite, non-negative divergence in nats.
    Score(f64),
    /// The reference distribution has no mass on the histogram's support.
    Undefined,
}

impl KlDivergence {
    /// Estimates the divergence of `histogram` from `model`.
    ///
    /// # Examples
    ///
    /// ```
    /// use normcheck_stats::{
    ///     divergence::KlDivergence,
    ///     histogram::Histogram,
    ///     normal::{Gaussian, NormalDistribution},
    /// };
    ///
    /// let histogram = Histogram::new([5.0; 4], 20, None, None);
    /// let model = Gaussian::new(5.0, 1e-4).unwrap();
    /// assert_eq!(KlDivergence::estimate(&histogram, &model), KlDivergence::Undefined);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn estimate<D>(histogram: &Histogram, model: &D) -> Self
    where
        D: NormalDistribution,
    {
        let total = histogram.total_count();
        if histogram.is_single_point() || total == 0 {
            return Self::Undefined;
        }
        let n = total as f64;

        let reference = histogram
            .bins
            .iter()
            .map(|bin| model.pdf(bin.center) * histogram.bin_width)
            .collect::<Vec<_>>();
        let reference_sum = reference.iter().sum::<f64>();
        if !reference_sum.is_finite() || reference_sum <= 0.0 {
            log::warn!("normal reference mass collapsed (sum = {reference_sum}); KL undefined");
            return Self::Undefined;
        }

        let divergence = histogram
            .bins
            .iter()
            .zip(&reference)
            .map(|(bin, q)| (bin.count as f64 / n, q / reference_sum))
            .filter(|&(p, q)| p > 0.0 && q > 0.0)
            .map(|(p, q)| p * (p / q).ln())
            .filter(|term| term.is_finite())
            .sum::<f64>();

        Self::Score(divergence.max(0.0))
    }

    /// The divergence score, or `None` if undefined.
    #[must_use]
    pub fn score(self) -> Option<f64> {
        match self {
            Self::Score(score) => Some(score),
            Self::Undefined => None,
        }
    }

    #[must_use]
    pub fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }
}
