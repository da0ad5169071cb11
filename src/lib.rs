//! exan_rs
//!
//! Turn a data table (and optionally one atomic structure per row) into an
//! interactive scatter-plot explorer page. Pairs with the `exan` CLI.
//!
//! ### Features
//! - Load CSV tables; non-numeric columns are ranked into integers
//! - Encode any column as palette color (0–255) or marker size
//! - Eight 256-color palettes, switchable on the page
//! - Write `visualize.html` with linked plot, overview, table and sliders
//! - Convert FHI-aims / XYZ structures for an embedded JSmol viewer
//! - Optional SVG/PNG thumbnail of the scatter
//!
//! ### Example
//! ```no_run
//! use exan_rs::{ExplorerOptions, ReportOptions, prepare, report, storage};
//!
//! let table = storage::load_csv("materials.csv")?;
//! let data = prepare(&table, &ExplorerOptions::default())?;
//! report::write_report(".", &data, &ReportOptions::default())?;
//! exan_rs::viz::plot_preview(&data, "preview.svg", 600, 600)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod encoding;
pub mod models;
pub mod palette;
pub mod prepare;
pub mod report;
pub mod stats;
pub mod storage;
pub mod structures;
pub mod viz;

pub use encoding::{EncodeError, to_color, to_size};
pub use models::{Column, ColumnData, Table};
pub use palette::PaletteName;
pub use prepare::{ExplorerOptions, PreparedData, prepare};
pub use report::ReportOptions;
pub use structures::StructureFormat;
