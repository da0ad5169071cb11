use crate::models::{ColumnData, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary statistics for one column.
///
/// For categorical columns the numeric fields describe the 1-based ranks the
/// labels are encoded with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub name: String,
    pub categorical: bool,
    pub count: usize,
    pub missing: usize,
    pub distinct: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute statistics for every column, in table order.
pub fn column_summaries(table: &Table) -> Vec<Summary> {
    table
        .columns()
        .iter()
        .map(|c| {
            let distinct = match &c.data {
                ColumnData::Categorical(v) => v
                    .iter()
                    .filter(|s| !s.is_empty())
                    .collect::<BTreeSet<_>>()
                    .len(),
                ColumnData::Numeric(v) => v
                    .iter()
                    .filter(|x| x.is_finite())
                    .map(|x| x.to_bits())
                    .collect::<BTreeSet<_>>()
                    .len(),
            };
            let all = c.data.to_numeric();
            let mut vals: Vec<f64> = all.iter().copied().filter(|v| v.is_finite()).collect();
            vals.sort_by(f64::total_cmp);
            let count = vals.len();
            let min = vals.first().cloned();
            let max = vals.last().cloned();
            let mean = if count > 0 {
                Some(vals.iter().copied().sum::<f64>() / count as f64)
            } else {
                None
            };
            let median = if count == 0 {
                None
            } else if count % 2 == 1 {
                Some(vals[count / 2])
            } else {
                Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
            };
            Summary {
                name: c.name.clone(),
                categorical: c.data.is_categorical(),
                count,
                missing: all.len() - count,
                distinct,
                min,
                max,
                mean,
                median,
            }
        })
        .collect()
}

/// Low/high bounds for a color bar over `values`.
///
/// A constant column is widened by one on each side so the mapper has a
/// non-degenerate range; a column without finite values gets `(1, 100)`.
pub fn color_bar_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return (1.0, 100.0);
    }
    if lo == hi { (lo - 1.0, hi + 1.0) } else { (lo, hi) }
}
