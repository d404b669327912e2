//! Normal distribution model
//!
//! The engine evaluates every normal density, cumulative probability and
//! quantile through the [`NormalDistribution`] trait, so hosts can inject
//! their own numerical backend. [`Gaussian`] is the default implementation,
//! backed by `statrs`.
//!
//! # Examples
//!
//! ```
//! use normcheck_stats::normal::{Gaussian, NormalDistribution};
//!
//! let standard = Gaussian::standard();
//! assert!((standard.cdf(0.0) - 0.5).abs() < 1e-15);
//! assert!((standard.quantile(0.975).unwrap() - 1.959_964).abs() < 1e-6);
//!
//! let fitted = Gaussian::new(10.0, 2.0).unwrap();
//! assert!((fitted.cdf(12.0) - standard.cdf(1.0)).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous as _, ContinuousCDF as _, Normal};

use crate::{AnalysisError, DomainError};

/// A normal distribution parameterized by mean and standard deviation.
pub trait NormalDistribution: Sized {
    /// Builds a distribution with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidModel`] unless `mean` is finite and
    /// `std_dev` is finite and positive.
    fn new(mean: f64, std_dev: f64) -> Result<Self, AnalysisError>;

    /// The standard normal distribution (mean 0, standard deviation 1).
    fn standard() -> Self;

    fn mean(&self) -> f64;

    fn std_dev(&self) -> f64;

    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative probability `P(X <= x)`.
    fn cdf(&self, x: f64) -> f64;

    /// Inverse of [`cdf`](Self::cdf).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] unless `0 < p < 1`.
    fn quantile(&self, p: f64) -> Result<f64, DomainError>;
}

/// Default [`NormalDistribution`] backed by [`statrs::distribution::Normal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    inner: Normal,
    mean: f64,
    std_dev: f64,
}

impl NormalDistribution for Gaussian {
    fn new(mean: f64, std_dev: f64) -> Result<Self, AnalysisError> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(AnalysisError::InvalidModel { mean, std_dev });
        }
        let inner =
            Normal::new(mean, std_dev).map_err(|_| AnalysisError::InvalidModel { mean, std_dev })?;
        Ok(Self {
            inner,
            mean,
            std_dev,
        })
    }

    fn standard() -> Self {
        Self {
            inner: Normal::standard(),
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn std_dev(&self) -> f64 {
        self.std_dev
    }

    fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.inner.cdf(x)
    }

    fn quantile(&self, p: f64) -> Result<f64, DomainError> {
        if p.is_nan() || p <= 0.0 || p >= 1.0 {
            return Err(DomainError { p });
        }
        Ok(self.inner.inverse_cdf(p))
    }
}

/// A single point of a sampled density curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Fitted density sampled at evenly spaced points, scaled to overlay a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalCurve {
    pub points: Vec<CurvePoint>,
}

impl NormalCurve {
    /// Samples `scale * pdf(x)` at `num_points` evenly spaced values over `[start, end]`.
    ///
    /// With `scale = n * bin_width` the curve is in the same units as histogram counts.
    /// A single requested point is placed at `start`; zero points yield an empty curve.
    ///
    /// # Examples
    ///
    /// ```
    /// use normcheck_stats::normal::{Gaussian, NormalCurve, NormalDistribution};
    ///
    /// let curve = NormalCurve::sample(&Gaussian::standard(), -4.0, 4.0, 101, 1.0);
    /// assert_eq!(curve.points.len(), 101);
    /// assert_eq!(curve.points[0].x, -4.0);
    /// assert!((curve.points[100].x - 4.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sample<D>(model: &D, start: f64, end: f64, num_points: usize, scale: f64) -> Self
    where
        D: NormalDistribution,
    {
        let points = match num_points {
            0 => vec![],
            1 => vec![CurvePoint {
                x: start,
                y: model.pdf(start) * scale,
            }],
            _ => {
                let last = (num_points - 1) as f64;
                (0..num_points)
                    .map(|i| {
                        // Interpolated so that the full finite range never overflows
                        let t = i as f64 / last;
                        let x = start * (1.0 - t) + end * t;
                        CurvePoint {
                            x,
                            y: model.pdf(x) * scale,
                        }
                    })
                    .collect()
            }
        };
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_matches_closed_form() {
        let model = Gaussian::new(1.5, 0.7).unwrap();
        for x in [-2.0, 0.0, 1.5, 3.3] {
            let z: f64 = (x - 1.5) / 0.7;
            let expected = (-0.5 * z * z).exp() / (0.7 * (2.0 * std::f64::consts::PI).sqrt());
            assert!((model.pdf(x) - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_cdf_tails() {
        let standard = Gaussian::standard();
        // Reference values of the standard normal CDF
        let cases = [
            (-6.0, 9.865_876_450_376_946e-10),
            (-3.0, 1.349_898_031_630_094_6e-3),
            (-1.0, 0.158_655_253_931_457_05),
            (1.0, 0.841_344_746_068_542_9),
            (3.0, 0.998_650_101_968_369_9),
        ];
        for (x, expected) in cases {
            let actual = standard.cdf(x);
            assert!(
                ((actual - expected) / expected).abs() < 1e-6,
                "cdf({x}) = {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        let model = Gaussian::new(-3.0, 4.0).unwrap();
        for p in [1e-6, 0.01, 0.25, 0.5, 0.8, 0.999] {
            let x = model.quantile(p).unwrap();
            assert!((model.cdf(x) - p).abs() < 1e-9, "p = {p}");
        }
    }

    #[test]
    fn test_quantile_domain() {
        let standard = Gaussian::standard();
        assert_eq!(standard.quantile(0.0), Err(DomainError { p: 0.0 }));
        assert_eq!(standard.quantile(1.0), Err(DomainError { p: 1.0 }));
        assert!(standard.quantile(-0.5).is_err());
        assert!(standard.quantile(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Gaussian::new(0.0, 0.0).is_err());
        assert!(Gaussian::new(0.0, -1.0).is_err());
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
        assert!(Gaussian::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_curve_scale() {
        let standard = Gaussian::standard();
        let curve = NormalCurve::sample(&standard, 0.0, 0.0, 1, 10.0);
        assert_eq!(curve.points.len(), 1);
        assert!((curve.points[0].y - 10.0 * standard.pdf(0.0)).abs() < 1e-12);
        assert!(NormalCurve::sample(&standard, 0.0, 1.0, 0, 1.0).points.is_empty());
    }
}
