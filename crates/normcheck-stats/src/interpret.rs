//! Interpretation of KL divergence scores
//!
//! A [`KlThresholds`] policy is an ordered list of buckets, each with an
//! exclusive upper bound (the last one may be unbounded). A score falls into
//! the first bucket whose bound it is below; scores beyond the last bound fall
//! into the last bucket.
//!
//! Two presets exist because the thresholds used in practice disagree:
//!
//! | preset       | buckets (upper bounds)                                      |
//! |--------------|-------------------------------------------------------------|
//! | [`standard`] | very close < 0.1, close < 0.3, moderate < 0.7, far          |
//! | [`gauge`]    | very close < 0.1, reasonable < 0.5, noticeable < 1.0, strong deviation < 1.2 |
//!
//! [`standard`]: KlThresholds::standard
//! [`gauge`]: KlThresholds::gauge

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, divergence::KlDivergence};

/// Named threshold presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPreset {
    /// 0.1 / 0.3 / 0.7 buckets used for the textual verdict.
    #[default]
    Standard,
    /// 0.1 / 0.5 / 1.0 / 1.2 buckets used for the horizontal gauge.
    Gauge,
}

impl ThresholdPreset {
    #[must_use]
    pub fn thresholds(self) -> KlThresholds {
        match self {
            Self::Standard => KlThresholds::standard(),
            Self::Gauge => KlThresholds::gauge(),
        }
    }
}

/// One interpretation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlBucket {
    /// Exclusive upper bound of scores in this bucket, `None` if unbounded.
    pub upper_bound: Option<f64>,
    /// Machine-readable level, e.g. `very_close`.
    pub level: String,
    /// Short display label, e.g. `Very Close`.
    pub label: String,
    /// Sentence describing the verdict.
    pub message: String,
}

impl KlBucket {
    #[must_use]
    pub fn new(upper_bound: f64, level: &str, label: &str, message: &str) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            level: level.to_owned(),
            label: label.to_owned(),
            message: message.to_owned(),
        }
    }

    /// A bucket catching every score above the previous bound.
    #[must_use]
    pub fn unbounded(level: &str, label: &str, message: &str) -> Self {
        Self {
            upper_bound: None,
            level: level.to_owned(),
            label: label.to_owned(),
            message: message.to_owned(),
        }
    }

    fn contains_below(&self, score: f64) -> bool {
        self.upper_bound.is_none_or(|bound| score < bound)
    }
}

impl fmt::Display for KlBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// An ordered KL interpretation policy.
///
/// Always holds at least one bucket; deserialization runs the same checks as
/// [`KlThresholds::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<KlBucket>", into = "Vec<KlBucket>")]
pub struct KlThresholds {
    buckets: Vec<KlBucket>,
}

impl TryFrom<Vec<KlBucket>> for KlThresholds {
    type Error = AnalysisError;

    fn try_from(buckets: Vec<KlBucket>) -> Result<Self, Self::Error> {
        Self::new(buckets)
    }
}

impl From<KlThresholds> for Vec<KlBucket> {
    fn from(thresholds: KlThresholds) -> Self {
        thresholds.buckets
    }
}

impl Default for KlThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

impl KlThresholds {
    /// Builds a policy from buckets ordered by upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidThresholds`] if `buckets` is empty, if
    /// the bounds are not finite and strictly increasing, or if a bucket other
    /// than the last is unbounded.
    pub fn new(buckets: Vec<KlBucket>) -> Result<Self, AnalysisError> {
        let Some((last, rest)) = buckets.split_last() else {
            return Err(AnalysisError::InvalidThresholds);
        };
        let bounds = rest
            .iter()
            .map(|bucket| bucket.upper_bound)
            .chain(last.upper_bound.map(Some))
            .collect::<Option<Vec<_>>>();
        let valid = bounds.is_some_and(|bounds| {
            bounds.iter().all(|bound| bound.is_finite())
                && bounds.windows(2).all(|pair| pair[0] < pair[1])
        });
        if !valid {
            return Err(AnalysisError::InvalidThresholds);
        }
        Ok(Self { buckets })
    }

    /// The 0.1 / 0.3 / 0.7 policy.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            buckets: vec![
                KlBucket::new(
                    0.1,
                    "very_close",
                    "Very Close",
                    "Your data is very close to normal distribution",
                ),
                KlBucket::new(
                    0.3,
                    "close",
                    "Close",
                    "Your data is reasonably close to normal distribution",
                ),
                KlBucket::new(
                    0.7,
                    "moderate",
                    "Moderate",
                    "Your data shows moderate deviation from normal distribution",
                ),
                KlBucket::unbounded(
                    "far",
                    "Far",
                    "Your data significantly deviates from normal distribution",
                ),
            ],
        }
    }

    /// The 0.1 / 0.5 / 1.0 / 1.2 gauge policy.
    #[must_use]
    pub fn gauge() -> Self {
        Self {
            buckets: vec![
                KlBucket::new(
                    0.1,
                    "very_close",
                    "Very Close",
                    "Your data is very close to normal distribution",
                ),
                KlBucket::new(
                    0.5,
                    "reasonable",
                    "Reasonable",
                    "Your data is reasonably close to normal distribution",
                ),
                KlBucket::new(
                    1.0,
                    "noticeable",
                    "Noticeable",
                    "Your data shows noticeable deviation from normal distribution",
                ),
                KlBucket::new(
                    1.2,
                    "strong_deviation",
                    "Strong Deviation",
                    "Your data strongly deviates from normal distribution",
                ),
            ],
        }
    }

    #[must_use]
    pub fn buckets(&self) -> &[KlBucket] {
        &self.buckets
    }

    /// Returns the bucket `score` falls into.
    #[must_use]
    pub fn classify(&self, score: f64) -> &KlBucket {
        let (last, rest) = self
            .buckets
            .split_last()
            .unwrap_or_else(|| unreachable!("thresholds are never empty"));
        rest.iter()
            .find(|bucket| bucket.contains_below(score))
            .unwrap_or(last)
    }

    /// Classifies a divergence result; an undefined divergence has no bucket.
    #[must_use]
    pub fn interpret(&self, divergence: KlDivergence) -> Option<&KlBucket> {
        divergence.score().map(|score| self.classify(score))
    }

    /// The largest positive upper bound, used as the end of a gauge scale.
    #[must_use]
    pub fn gauge_max(&self) -> f64 {
        self.buckets
            .iter()
            .rev()
            .find_map(|bucket| bucket.upper_bound.filter(|bound| *bound > 0.0))
            .unwrap_or(1.0)
    }

    /// Position of `score` on the gauge scale, in `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::interpret::KlThresholds;
    /// let gauge = KlThresholds::gauge();
    /// assert_eq!(gauge.gauge_position(0.6), 0.5);
    /// assert_eq!(gauge.gauge_position(3.0), 1.0);
    /// assert_eq!(gauge.gauge_position(-1.0), 0.0);
    /// ```
    #[must_use]
    pub fn gauge_position(&self, score: f64) -> f64 {
        let max = self.gauge_max();
        score.clamp(0.0, max) / max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_buckets() {
        let thresholds = KlThresholds::standard();
        let levels = [0.0, 0.099, 0.1, 0.29, 0.3, 0.69, 0.7, 50.0]
            .map(|score| thresholds.classify(score).level.as_str());
        assert_eq!(
            levels,
            [
                "very_close",
                "very_close",
                "close",
                "close",
                "moderate",
                "moderate",
                "far",
                "far"
            ]
        );
    }

    #[test]
    fn test_gauge_buckets_saturate() {
        let thresholds = KlThresholds::gauge();
        assert_eq!(thresholds.classify(0.4).level, "reasonable");
        assert_eq!(thresholds.classify(1.1).level, "strong_deviation");
        assert_eq!(thresholds.classify(7.0).level, "strong_deviation");
        assert!((thresholds.gauge_max() - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_presets_disagree() {
        let score = 0.4;
        assert_eq!(KlThresholds::standard().classify(score).level, "moderate");
        assert_eq!(KlThresholds::gauge().classify(score).level, "reasonable");
        assert_eq!(ThresholdPreset::Gauge.thresholds(), KlThresholds::gauge());
    }

    #[test]
    fn test_undefined_has_no_bucket() {
        let thresholds = KlThresholds::standard();
        assert!(thresholds.interpret(KlDivergence::Undefined).is_none());
        assert_eq!(
            thresholds.interpret(KlDivergence::Score(0.2)).map(|b| b.level.as_str()),
            Some("close")
        );
    }

    #[test]
    fn test_custom_policy_validation() {
        assert_eq!(
            KlThresholds::new(vec![]),
            Err(AnalysisError::InvalidThresholds)
        );
        let unordered = vec![
            KlBucket::new(0.5, "a", "A", "a"),
            KlBucket::new(0.2, "b", "B", "b"),
        ];
        assert_eq!(
            KlThresholds::new(unordered),
            Err(AnalysisError::InvalidThresholds)
        );
        let custom = KlThresholds::new(vec![
            KlBucket::new(0.05, "good", "Good", "good"),
            KlBucket::unbounded("bad", "Bad", "bad"),
        ])
        .unwrap();
        assert_eq!(custom.classify(1e300).level, "bad");
        let unbounded_first = vec![
            KlBucket::unbounded("a", "A", "a"),
            KlBucket::new(0.2, "b", "B", "b"),
        ];
        assert!(KlThresholds::new(unbounded_first).is_err());
        assert!(KlThresholds::new(vec![KlBucket::new(f64::NAN, "a", "A", "a")]).is_err());
        assert_eq!(custom.classify(0.01).to_string(), "Good");
        assert_eq!(custom.gauge_max(), 0.05);
    }

    #[test]
    fn test_deserialization_is_validated() {
        for thresholds in [KlThresholds::standard(), KlThresholds::gauge()] {
            let json = serde_json::to_string(&thresholds).unwrap();
            let back = serde_json::from_str::<KlThresholds>(&json).unwrap();
            assert_eq!(back, thresholds);
        }
        assert!(serde_json::from_str::<KlThresholds>("[]").is_err());
    }
}
