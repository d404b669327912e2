//! Normality diagnostics for numeric samples.
//!
//! This crate measures how closely a sample of real numbers resembles a normal
//! (Gaussian) distribution fitted to it by the method of moments. It provides:
//!
//! - **Sample extraction**: Turn delimited text into a cleaned sequence of finite numbers
//! - **Descriptive statistics**: Count, mean, standard deviation, median, min and max
//! - **Normal model**: PDF, CDF and quantile function of a fitted normal distribution
//! - **Histogram generation**: Equal-width binning with adaptive bin counts
//! - **KL divergence**: Discretized divergence between the histogram and the fitted normal
//! - **Anderson-Darling**: Goodness-of-fit statistic with a critical-value table
//! - **Q-Q mapping**: Theoretical vs. sample quantile pairs, downsampled for large inputs
//! - **Interpretation**: Pluggable threshold policies that bucket a KL score
//!
//! # Modules
//!
//! - [`sample`]: Numeric extraction and the validated [`Sample`](sample::Sample) type
//! - [`descriptive`]: Descriptive statistics with selectable variance normalization
//! - [`normal`]: Normal distribution model and density curve sampling
//! - [`histogram`]: Histogram construction and bin-count strategies
//! - [`divergence`]: Kullback-Leibler divergence estimator
//! - [`anderson_darling`]: Anderson-Darling statistic and critical values
//! - [`qq`]: Q-Q plot coordinates
//! - [`interpret`]: KL score interpretation policies
//! - [`analysis`]: The [`analyze`](analysis::analyze) entry point combining everything
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use normcheck_stats::descriptive::{DescriptiveStats, VarianceMode};
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values, VarianceMode::Population).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Running a full analysis
//!
//! ```
//! use normcheck_stats::{
//!     analysis::{AnalysisOptions, analyze},
//!     sample::Sample,
//! };
//!
//! let sample = Sample::from_text("1, 2, 3, 4, 5, 6, 7, 8, 9, 10").unwrap();
//! let result = analyze(&sample, &AnalysisOptions::default()).unwrap();
//! assert_eq!(result.stats.count, 10);
//! assert_eq!(result.stats.median, 5.5);
//! ```
//!
//! ## Interpreting a KL score
//!
//! ```
//! use normcheck_stats::interpret::KlThresholds;
//!
//! let thresholds = KlThresholds::standard();
//! assert_eq!(thresholds.classify(0.05).level, "very_close");
//! assert_eq!(thresholds.classify(0.5).level, "moderate");
//! ```

pub mod analysis;
pub mod anderson_darling;
pub mod descriptive;
pub mod divergence;
pub mod histogram;
pub mod interpret;
pub mod normal;
pub mod qq;
pub mod sample;

/// Error returned when a probability lies outside the open interval `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("probability {p} is outside the open interval (0, 1)")]
pub struct DomainError {
    pub p: f64,
}

/// Errors produced by the analysis engine and its ingestion helpers.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("no numeric values found in input")]
    NoNumericData,
    #[display("at least {required} data points are required, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[display("value at index {index} is not a finite number")]
    NonFiniteValue { index: usize },
    #[display("invalid normal model parameters: mean={mean}, std_dev={std_dev}")]
    InvalidModel { mean: f64, std_dev: f64 },
    #[display("KL thresholds must be non-empty with strictly increasing upper bounds")]
    InvalidThresholds,
    #[display("{_0}")]
    Domain(DomainError),
}

impl From<DomainError> for AnalysisError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}
