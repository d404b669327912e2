//! Numeric extraction and validated samples
//!
//! Raw text is split on whitespace and commas, each token is parsed as a
//! floating-point number, and tokens that fail to parse or parse to NaN or
//! ±infinity are discarded. The surviving numbers keep their input order.
//!
//! # Examples
//!
//! ```
//! use normcheck_stats::sample::{Sample, extract_numbers};
//!
//! let values = extract_numbers("1.5, 2\n3 abc NaN inf -4e1");
//! assert_eq!(values, vec![1.5, 2.0, 3.0, -40.0]);
//!
//! let sample = Sample::new(values).unwrap();
//! assert_eq!(sample.sorted(), &[-40.0, 1.5, 2.0, 3.0]);
//! ```

use crate::AnalysisError;

/// Extracts every finite number from delimited text, preserving input order.
///
/// Tokens are separated by any run of whitespace and/or commas. Tokens that
/// are not numbers are skipped silently.
#[must_use]
pub fn extract_numbers(text: &str) -> Vec<f64> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

/// Like [`extract_numbers`], but fails when the text contains no numbers at all.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>, AnalysisError> {
    let values = extract_numbers(text);
    if values.is_empty() {
        return Err(AnalysisError::NoNumericData);
    }
    Ok(values)
}

/// An ordered, non-empty sequence of finite numbers.
///
/// The sorted copy used by most algorithms is computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
    sorted: Vec<f64>,
}

impl Sample {
    /// Validates `values` and builds a sample.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::NoNumericData`] if `values` is empty
    /// * [`AnalysisError::NonFiniteValue`] if any value is NaN or infinite
    pub fn new(values: Vec<f64>) -> Result<Self, AnalysisError> {
        if values.is_empty() {
            return Err(AnalysisError::NoNumericData);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteValue { index });
        }
        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        Ok(Self { values, sorted })
    }

    /// Parses delimited text into a sample.
    pub fn from_text(text: &str) -> Result<Self, AnalysisError> {
        Self::new(parse_numbers(text)?)
    }

    /// Values in their original order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values sorted in ascending order.
    #[must_use]
    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
