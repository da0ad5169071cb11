//! Visual encodings: map a data column onto a palette index or a marker size.
//!
//! Both encoders are pure. Non-finite entries (missing CSV cells) do not take
//! part in the min/max computation and receive the fallback value.

use std::collections::{BTreeMap, BTreeSet};

/// Palette index used when a column carries no variation.
pub const COLOR_FALLBACK: u8 = 128;
/// Marker size at the midpoint of a column's range.
pub const MEDIAN_POINT_SIZE: f64 = 10.0;
/// Maximum distance of an encoded size from [`MEDIAN_POINT_SIZE`].
pub const DEVIATION: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode an empty column")]
    EmptyInput,
}

/// Finite (min, max) of a column, or `None` when no entry is finite.
fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Encode a column as palette indices in `0..=255`.
///
/// The minimum maps to 0 and the maximum to 255; intermediate values are
/// scaled linearly and rounded half-to-even. A constant column maps to
/// [`COLOR_FALLBACK`] everywhere.
///
/// ```
/// use exan_rs::encoding::to_color;
/// assert_eq!(to_color(&[0.0, 10.0]).unwrap(), vec![0, 255]);
/// assert_eq!(to_color(&[5.0, 5.0]).unwrap(), vec![128, 128]);
/// ```
pub fn to_color(values: &[f64]) -> Result<Vec<u8>, EncodeError> {
    if values.is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    let Some((min, max)) = finite_range(values) else {
        return Ok(vec![COLOR_FALLBACK; values.len()]);
    };
    let span = max - min;
    if span == 0.0 {
        return Ok(vec![COLOR_FALLBACK; values.len()]);
    }
    let scale = 255.0 / span;
    Ok(values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                ((v - min) * scale).round_ties_even().clamp(0.0, 255.0) as u8
            } else {
                COLOR_FALLBACK
            }
        })
        .collect())
}

/// Encode a column as marker sizes centered on [`MEDIAN_POINT_SIZE`].
///
/// The midpoint of the column's range maps to the median size, the extremes to
/// `MEDIAN_POINT_SIZE ± DEVIATION`.
pub fn to_size(values: &[f64]) -> Result<Vec<f64>, EncodeError> {
    if values.is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    let Some((min, max)) = finite_range(values) else {
        return Ok(vec![MEDIAN_POINT_SIZE; values.len()]);
    };
    let mid = (max - min) / 2.0 + min;
    let max_shifted = max - mid;
    if max_shifted == 0.0 {
        return Ok(vec![MEDIAN_POINT_SIZE; values.len()]);
    }
    let scale = DEVIATION / max_shifted;
    Ok(values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                scale * (v - mid) + MEDIAN_POINT_SIZE
            } else {
                MEDIAN_POINT_SIZE
            }
        })
        .collect())
}

/// Rank every distinct label by sorted order, starting at 1.
pub fn category_ranks<T: Ord + Clone>(labels: &[T]) -> BTreeMap<T, usize> {
    labels
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i + 1))
        .collect()
}

/// Replace each label by its rank so the column can be encoded like numeric data.
///
/// ```
/// use exan_rs::encoding::encode_categorical;
/// assert_eq!(encode_categorical(&["b", "a", "c"]), vec![2.0, 1.0, 3.0]);
/// ```
pub fn encode_categorical<T: Ord + Clone>(labels: &[T]) -> Vec<f64> {
    let ranks = category_ranks(labels);
    labels.iter().map(|l| ranks[l] as f64).collect()
}
