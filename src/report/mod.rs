//! Explorer page generation.
//!
//! The page is one HTML file: a JSON payload with the prepared data, the
//! explorer script and stylesheet (compiled into the binary), and D3 from its
//! CDN. When structures are attached, the JSmol panel is added and the JSmol
//! companion files are written next to the page.

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::palette::PaletteName;
use crate::prepare::{
    NONE_COLOR, NONE_SIZE, OVERVIEW_PLOT_DIMENSION, PLOT_DIMENSION, PLOT_RATIO, PreparedData,
    SELECT_WIDTH, TABLE_HEIGHT,
};
use crate::structures::STRUCTURE_DIR;

/// File name of the explorer page inside the output directory.
pub const PAGE_FILE: &str = "visualize.html";
pub const D3_URL: &str = "https://d3js.org/d3.v7.min.js";

const EXPLORER_JS: &str = include_str!("explorer.js");
const EXPLORER_CSS: &str = include_str!("explorer.css");
const JSMOL_CSS: &str = include_str!("jsmol.css");

/// JSmol glue written next to the page: (file name, contents).
pub const JSMOL_FILES: [(&str, &str); 3] = [
    ("myjsmol.js", include_str!("jsmol/myjsmol.js")),
    ("pop.html", include_str!("jsmol/pop.html")),
    ("compare.html", include_str!("jsmol/compare.html")),
];

/// Characters escaped in image URLs before they land in `src` attributes.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'`');

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: String,
    /// Add the 3D structure panel; requires `structures/set{i}.xyz` files.
    pub jsmol: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Visualizer".to_string(),
            jsmol: false,
        }
    }
}

/// JSON payload read by the explorer script.
pub fn payload(data: &PreparedData, opts: &ReportOptions) -> Value {
    let palettes: serde_json::Map<String, Value> = PaletteName::ALL
        .iter()
        .map(|p| (p.as_str().to_string(), json!(p.palette().hex_colors())))
        .collect();

    let mut plot = json!(data.plot);
    if let Some(imgs) = &data.plot.imgs {
        let encoded: Vec<String> = imgs
            .iter()
            .map(|s| utf8_percent_encode(s, URL_UNSAFE).to_string())
            .collect();
        plot["imgs"] = json!(encoded);
    }

    json!({
        "columns": data.columns,
        "numeric": data.numeric,
        "colors": data.colors,
        "sizes": data.sizes,
        "originals": data.originals,
        "plot": plot,
        "palette": data.palette.as_str(),
        "palettes": palettes,
        "xIndex": data.x_index,
        "yIndex": data.y_index,
        "colorColumn": data.color_column(),
        "sizeColumn": data.size_column(),
        "colorBar": data.color_bar,
        "view": data.view,
        "log": data.log,
        "jsmol": opts.jsmol,
        "structurePattern": format!("{STRUCTURE_DIR}/set{{}}.xyz"),
        "constants": {
            "noneColor": NONE_COLOR,
            "noneSize": NONE_SIZE,
            "plotRatio": PLOT_RATIO,
            "plotDimension": PLOT_DIMENSION,
            "overviewDimension": OVERVIEW_PLOT_DIMENSION,
            "selectWidth": SELECT_WIDTH,
            "tableHeight": TABLE_HEIGHT,
        },
    })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize JSON for a `<script>` block; `<` only occurs inside strings, so
/// escaping it keeps `</script>` in the data from closing the block.
fn embed_json(v: &Value) -> Result<String> {
    Ok(serde_json::to_string(v)?.replace('<', "\\u003c"))
}

const JSMOL_HEAD: &str = r#"<script type="text/javascript" src="JSmol.min.js"></script>
<script type="text/javascript" src="myjsmol.js"></script>
<script type="text/javascript">
  localStorage.setItem("indexref", "0");
  localStorage.setItem("attributes", "[]");
</script>"#;

const JSMOL_PANEL: &str = r#"<div id="jsmol_hold">
  <iframe name="compare" width="250" height="275" frameborder="0"></iframe>
</div>
<div id="jsmol">
  <button class="button" id="analyze" onclick="cloneJSmol(jmolApplet0);"><span>Analyze</span></button>
  <button class="button" id="hold" onclick="holdJSmol(jmolApplet0);"><span>Hold</span></button>
  <div id="appdiv"></div>
  <div id="molecule_text"> Selected molecule ID: 0</div>
</div>"#;

/// Render the explorer page.
pub fn render_page(data: &PreparedData, opts: &ReportOptions) -> Result<String> {
    let json = embed_json(&payload(data, opts))?;
    let title = escape_html(&opts.title);
    let generated = Utc::now().to_rfc3339();
    let (jsmol_head, jsmol_css, jsmol_panel) = if opts.jsmol {
        (JSMOL_HEAD, JSMOL_CSS, JSMOL_PANEL)
    } else {
        ("", "", "")
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="generated" content="{generated}">
<title>{title}</title>
<script src="{D3_URL}"></script>
{jsmol_head}
<style>
{EXPLORER_CSS}
{jsmol_css}
</style>
</head>
<body>
<div class="wrapper" style="position:relative;">
  <div class="row" id="select-row"></div>
  <div class="row" id="slider-row"></div>
  <div class="row" id="plot-row">
    <div id="plot"></div>
    <div id="overview"></div>
  </div>
  <div id="table"></div>
  <pre id="log"></pre>
{jsmol_panel}
</div>
<script type="application/json" id="explorer-data">{json}</script>
<script>
{EXPLORER_JS}
</script>
</body>
</html>
"#
    ))
}

/// Write the JSmol companion files into `out_dir`.
pub fn write_jsmol_assets<P: AsRef<Path>>(out_dir: P) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    JSMOL_FILES
        .iter()
        .map(|(name, body)| {
            let p = out_dir.join(name);
            fs::write(&p, body).with_context(|| format!("writing {}", p.display()))?;
            Ok(p)
        })
        .collect()
}

/// Write `visualize.html` (plus JSmol files when enabled) into `out_dir`.
/// Returns the page path.
pub fn write_report<P: AsRef<Path>>(
    out_dir: P,
    data: &PreparedData,
    opts: &ReportOptions,
) -> Result<PathBuf> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let page = render_page(data, opts)?;
    let path = out_dir.join(PAGE_FILE);
    fs::write(&path, page).with_context(|| format!("writing {}", path.display()))?;
    if opts.jsmol {
        info!("Writing file dependencies...");
        write_jsmol_assets(out_dir)?;
    }
    Ok(path)
}
