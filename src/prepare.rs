//! Turn a [`Table`] into everything the explorer page needs: numeric, color,
//! and size frames, the initial plot source, the sampled view, and the color bar.

use anyhow::{Context, Result, bail};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::encoding::{to_color, to_size};
use crate::models::{Column, Table};
use crate::palette::PaletteName;
use crate::stats::color_bar_range;

/// Marker color when no color column is selected (CSS `lightskyblue`).
pub const NONE_COLOR: &str = "#87cefa";
/// Marker size when no size column is selected.
pub const NONE_SIZE: f64 = 10.0;
/// Name of the pseudo column that stands for "no encoding".
pub const NONE_COLUMN: &str = "None";
pub const PLOT_DIMENSION: u32 = 500;
pub const OVERVIEW_PLOT_DIMENSION: u32 = 200;
/// Main plot size over overview size; overview markers are scaled down by it.
pub const PLOT_RATIO: f64 = PLOT_DIMENSION as f64 / OVERVIEW_PLOT_DIMENSION as f64;
pub const SELECT_WIDTH: u32 = 100;
pub const TABLE_HEIGHT: u32 = 200;
/// Tables with at least this many rows start with a random subset shown.
pub const SAMPLE_LIMIT: usize = 2000;

/// Which columns drive which channel, plus the page's free-text log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerOptions {
    pub palette: PaletteName,
    pub x_index: usize,
    pub y_index: usize,
    /// `None`, or an index past the last column, selects the "None" encoding.
    pub color_index: Option<usize>,
    pub size_index: Option<usize>,
    pub log: String,
    /// One image URL per row, shown in hover tooltips.
    pub images: Option<Vec<String>>,
    /// Seed for the initial row subsample; random when unset.
    pub seed: Option<u64>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            palette: PaletteName::default(),
            x_index: 0,
            y_index: 1,
            color_index: Some(2),
            size_index: Some(3),
            log: "No Log File".to_string(),
            images: None,
            seed: None,
        }
    }
}

/// Columns bound to the scatter glyphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSource {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Fill color per point (CSS hex).
    pub c: Vec<String>,
    pub s: Vec<f64>,
    /// Overview marker size, `s / PLOT_RATIO`.
    pub os: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imgs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBar {
    pub low: f64,
    pub high: f64,
    pub visible: bool,
}

/// Rows drawn initially, and the fraction of the table they represent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleView {
    pub fraction: f64,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedData {
    pub columns: Vec<String>,
    /// Data frame after the categorical pre-pass, one vector per column.
    pub numeric: Vec<Vec<f64>>,
    pub colors: Vec<Vec<u8>>,
    pub sizes: Vec<Vec<f64>>,
    /// Untouched source columns, for the data table and tooltips.
    pub originals: Vec<Column>,
    pub plot: PlotSource,
    pub palette: PaletteName,
    pub x_index: usize,
    pub y_index: usize,
    pub color_index: Option<usize>,
    pub size_index: Option<usize>,
    pub color_bar: ColorBar,
    pub view: SampleView,
    pub log: String,
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.plot.x.len()
    }

    pub fn has_images(&self) -> bool {
        self.plot.imgs.is_some()
    }

    /// Name of the selected color column, or [`NONE_COLUMN`].
    pub fn color_column(&self) -> &str {
        self.color_index
            .map(|i| self.columns[i].as_str())
            .unwrap_or(NONE_COLUMN)
    }

    pub fn size_column(&self) -> &str {
        self.size_index
            .map(|i| self.columns[i].as_str())
            .unwrap_or(NONE_COLUMN)
    }
}

/// Encode `table` for display according to `options`.
pub fn prepare(table: &Table, options: &ExplorerOptions) -> Result<PreparedData> {
    if table.is_empty() {
        bail!("cannot build an explorer from an empty table");
    }
    let n_cols = table.n_columns();
    let n_rows = table.n_rows();
    for (axis, idx) in [("x", options.x_index), ("y", options.y_index)] {
        if idx >= n_cols {
            bail!("{axis} column index {idx} out of range (table has {n_cols} columns)");
        }
    }
    if let Some(imgs) = &options.images
        && imgs.len() != n_rows
    {
        bail!("{} image paths given for {} rows", imgs.len(), n_rows);
    }

    info!("Adjusting in case of non-numerical data...");
    let mut log = options.log.clone();
    let mut numeric = Vec::with_capacity(n_cols);
    for c in table.columns() {
        if c.data.is_categorical() {
            log.push_str(&format!(
                "\nChanging column {} of type str to categorical.",
                c.name
            ));
        }
        numeric.push(c.data.to_numeric());
    }

    let colors = numeric
        .iter()
        .zip(table.columns())
        .map(|(v, c)| to_color(v).with_context(|| format!("color encoding of '{}'", c.name)))
        .collect::<Result<Vec<_>>>()?;
    let sizes = numeric
        .iter()
        .zip(table.columns())
        .map(|(v, c)| to_size(v).with_context(|| format!("size encoding of '{}'", c.name)))
        .collect::<Result<Vec<_>>>()?;

    let color_index = options.color_index.filter(|&i| i < n_cols);
    let size_index = options.size_index.filter(|&i| i < n_cols);

    let palette = options.palette.palette();
    let c = match color_index {
        Some(i) => colors[i].iter().map(|&idx| palette.color(idx).hex()).collect(),
        None => vec![NONE_COLOR.to_string(); n_rows],
    };
    let s = match size_index {
        Some(i) => sizes[i].clone(),
        None => vec![NONE_SIZE; n_rows],
    };
    let os = s.iter().map(|v| v / PLOT_RATIO).collect();

    let color_bar = match color_index {
        Some(i) if options.palette.is_continuous() => {
            let (low, high) = color_bar_range(&numeric[i]);
            ColorBar {
                low,
                high,
                visible: true,
            }
        }
        _ => ColorBar {
            low: 1.0,
            high: 100.0,
            visible: false,
        },
    };

    let plot = PlotSource {
        x: numeric[options.x_index].clone(),
        y: numeric[options.y_index].clone(),
        c,
        s,
        os,
        imgs: options.images.clone(),
    };

    Ok(PreparedData {
        columns: table.names().into_iter().map(String::from).collect(),
        numeric,
        colors,
        sizes,
        originals: table.columns().to_vec(),
        plot,
        palette: options.palette,
        x_index: options.x_index,
        y_index: options.y_index,
        color_index,
        size_index,
        color_bar,
        view: sample_rows(n_rows, options.seed),
        log,
    })
}

/// Pick the rows shown on first load.
///
/// Below [`SAMPLE_LIMIT`] rows everything is shown. Larger tables show
/// `round(SAMPLE_LIMIT / n, 1)` of their rows (half-to-even, at least 10%), chosen uniformly
/// without replacement and returned in ascending order.
pub fn sample_rows(n_rows: usize, seed: Option<u64>) -> SampleView {
    if n_rows < SAMPLE_LIMIT {
        return SampleView {
            fraction: 1.0,
            indices: (0..n_rows).collect(),
        };
    }
    let fraction = ((SAMPLE_LIMIT as f64 / n_rows as f64) * 10.0).round_ties_even() / 10.0;
    let fraction = fraction.max(0.1);
    let amount = ((fraction * n_rows as f64) as usize).min(n_rows);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut indices = rand::seq::index::sample(&mut rng, n_rows, amount).into_vec();
    indices.sort_unstable();
    SampleView { fraction, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_tables_are_fully_shown() {
        let v = sample_rows(1999, None);
        assert_eq!(v.fraction, 1.0);
        assert_eq!(v.indices.len(), 1999);
    }

    #[test]
    fn large_tables_are_subsampled() {
        let v = sample_rows(4000, Some(7));
        assert_eq!(v.fraction, 0.5);
        assert_eq!(v.indices.len(), 2000);
        assert!(v.indices.windows(2).all(|w| w[0] < w[1]));

        // 0.25 rounds to the even neighbour
        let v = sample_rows(8000, Some(1));
        assert_eq!(v.fraction, 0.2);
        assert_eq!(v.indices.len(), 1600);

        let tiny = sample_rows(100_000, Some(7));
        assert_eq!(tiny.fraction, 0.1);
        assert_eq!(tiny.indices.len(), 10_000);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        assert_eq!(sample_rows(5000, Some(42)), sample_rows(5000, Some(42)));
    }
}
