//! Static scatter thumbnails rendered to **SVG** or **PNG**.
//!
//! Draws the initially visible points with their palette colors and encoded
//! sizes inside a thin frame. No text is rendered, so no font is required.

use crate::prepare::PreparedData;
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;

/// Padding between frame and data, in pixels.
const MARGIN: u32 = 16;

fn parse_hex(hex: &str) -> Option<RGBColor> {
    let h = hex.strip_prefix('#')?;
    if h.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(h, 16).ok()?;
    Some(RGBColor((v >> 16) as u8, (v >> 8) as u8, v as u8))
}

/// Padded data range; constant axes are widened by one.
fn axis_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Render the sampled scatter of `data` to `out_path` (`.svg` or bitmap by extension).
pub fn plot_preview<P: AsRef<Path>>(
    data: &PreparedData,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_preview(root, data)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_preview(root, data)
    }
}

fn draw_preview<DB>(root: DrawingArea<DB, Shift>, data: &PreparedData) -> Result<()>
where
    DB: DrawingBackend,
{
    let rows = &data.view.indices;
    let (x0, x1) = axis_range(rows.iter().map(|&i| data.plot.x[i]))
        .ok_or_else(|| anyhow!("no finite x values to plot"))?;
    let (y0, y1) = axis_range(rows.iter().map(|&i| data.plot.y[i]))
        .ok_or_else(|| anyhow!("no finite y values to plot"))?;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (w, h) = root.dim_in_pixel();
    root.draw(&Rectangle::new(
        [(0, 0), (w as i32 - 1, h as i32 - 1)],
        BLACK.mix(0.2).stroke_width(1),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(
            rows.iter()
                .filter(|&&i| data.plot.x[i].is_finite() && data.plot.y[i].is_finite())
                .map(|&i| {
                    let color = parse_hex(&data.plot.c[i]).unwrap_or(RGBColor(135, 206, 250));
                    let radius = (data.plot.s[i] / 2.0).round().max(1.0) as i32;
                    Circle::new(
                        (data.plot.x[i], data.plot.y[i]),
                        radius,
                        color.mix(0.7).filled(),
                    )
                }),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
