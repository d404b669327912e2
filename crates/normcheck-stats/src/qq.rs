//! Q-Q (quantile-quantile) coordinates against the standard normal
//!
//! Each selected order statistic `x_i` (rank `i` of `m` selected points) is
//! paired with the standard normal quantile of its plotting position
//! `(i - 0.5) / m`. Sample values are standardized with the fitted mean and
//! standard deviation, so a normal sample tracks the identity line.
//!
//! Samples larger than the output cap are thinned by taking every `k`-th
//! sorted value with `k = ceil(n / max_points)`. The selection is
//! deterministic.

use serde::{Deserialize, Serialize};

use crate::{DomainError, normal::NormalDistribution};

/// A point on a Q-Q plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QqPoint {
    /// Standard normal quantile of the plotting position.
    pub theoretical: f64,
    /// Standardized sample value `(x - mean) / std_dev`.
    pub sample: f64,
}

impl QqPoint {
    /// Vertical distance from the identity line.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        self.sample - self.theoretical
    }
}

/// Builds Q-Q points for `sorted_values` using a normal fitted as `model`.
///
/// At most `max_points` points are produced (a cap of zero is treated as one);
/// when the sample fits under the cap every value is used.
///
/// # Errors
///
/// Propagates [`DomainError`] from the quantile function. Plotting positions
/// always lie strictly inside `(0, 1)`, so a well-behaved backend never fails.
///
/// # Panics
///
/// Panics in debug mode if `sorted_values` is not sorted in ascending order.
///
/// # Examples
///
/// ```
/// use normcheck_stats::{
///     normal::{Gaussian, NormalDistribution},
///     qq::qq_points,
/// };
///
/// let sorted = (0..5_000).map(f64::from).collect::<Vec<_>>();
/// let model = Gaussian::new(2_499.5, 1_443.5).unwrap();
/// let points = qq_points(&sorted, &model, 1_000).unwrap();
/// assert_eq!(points.len(), 1_000);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn qq_points<D>(
    sorted_values: &[f64],
    model: &D,
    max_points: usize,
) -> Result<Vec<QqPoint>, DomainError>
where
    D: NormalDistribution,
{
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );

    let stride = sorted_values.len().div_ceil(max_points.max(1)).max(1);
    let selected = sorted_values.iter().step_by(stride).collect::<Vec<_>>();
    let m = selected.len() as f64;
    let standard = D::standard();

    selected
        .into_iter()
        .enumerate()
        .map(|(i, &x)| {
            let position = (i as f64 + 0.5) / m;
            Ok(QqPoint {
                theoretical: standard.quantile(position)?,
                sample: (x - model.mean()) / model.std_dev(),
            })
        })
        .collect()
}
