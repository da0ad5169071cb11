use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::encoding::category_ranks;

/// Values of one column. A column is categorical as soon as one cell is not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    /// Missing cells are stored as `NaN`.
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnData::Categorical(_))
    }

    /// Numeric view of the column: categorical labels become their 1-based rank.
    /// Empty labels are missing values (`NaN`) and take no rank.
    pub fn to_numeric(&self) -> Vec<f64> {
        match self {
            ColumnData::Numeric(v) => v.clone(),
            ColumnData::Categorical(v) => {
                let labels: Vec<&String> = v.iter().filter(|s| !s.is_empty()).collect();
                let ranks = category_ranks(&labels);
                v.iter()
                    .map(|s| match ranks.get(&s) {
                        Some(&r) => r as f64,
                        None => f64::NAN,
                    })
                    .collect()
            }
        }
    }

    /// Cell as JSON; `NaN` becomes `null`.
    pub fn json_cell(&self, row: usize) -> serde_json::Value {
        match self {
            ColumnData::Numeric(v) => serde_json::Number::from_f64(v[row])
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ColumnData::Categorical(v) => serde_json::Value::String(v[row].clone()),
        }
    }

    /// Cell rendered as text, the way the data table shows it.
    pub fn display_cell(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(v) if v[row].is_nan() => String::new(),
            ColumnData::Numeric(v) => v[row].to_string(),
            ColumnData::Categorical(v) => v[row].clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// A rectangular data table: uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.data.len();
            for c in &columns {
                if c.data.len() != n {
                    bail!(
                        "column '{}' has {} rows, expected {} (from column '{}')",
                        c.name,
                        c.data.len(),
                        n,
                        first.name
                    );
                }
            }
        }
        let mut seen = BTreeSet::new();
        for c in &columns {
            if !seen.insert(c.name.as_str()) {
                bail!("duplicate column name '{}'", c.name);
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0 || self.columns.is_empty()
    }
}
