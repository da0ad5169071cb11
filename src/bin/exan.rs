use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

use exan_rs::models::ColumnData;
use exan_rs::{
    ExplorerOptions, PaletteName, ReportOptions, StructureFormat, prepare, report, stats,
    storage, structures, viz,
};

#[derive(Parser, Debug)]
#[command(
    name = "exan",
    version,
    about = "Build an interactive scatter-plot explorer page from a data table"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write visualize.html (and JSmol files when structures are given).
    Render(RenderArgs),
    /// List the available palettes.
    Palettes,
    /// Print per-column statistics of a CSV table.
    Stats {
        /// CSV file with a header row
        data: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// CSV file with a header row
    data: PathBuf,
    /// Structure files, one per row, in row order
    #[arg(long, num_args = 1..)]
    structures: Vec<PathBuf>,
    /// Text file listing structure files, one per line
    #[arg(long, conflicts_with = "structures")]
    structure_list: Option<PathBuf>,
    /// Format of the structure files
    #[arg(long, value_enum, default_value_t = StructureFormat::Aims)]
    format: StructureFormat,
    /// Skip converting structures (reuse an existing structures/ directory)
    #[arg(long, default_value_t = false)]
    no_create_files: bool,
    /// Initial palette
    #[arg(long, default_value_t = PaletteName::Viridis256)]
    palette: PaletteName,
    /// Column index for the x axis
    #[arg(short = 'x', long, default_value_t = 0)]
    x_index: usize,
    /// Column index for the y axis
    #[arg(short = 'y', long, default_value_t = 1)]
    y_index: usize,
    /// Column index for color, or "none"
    #[arg(long, default_value = "2", value_parser = parse_channel)]
    color: Channel,
    /// Column index for marker size, or "none"
    #[arg(long, default_value = "3", value_parser = parse_channel)]
    size: Channel,
    /// Text file shown in the log panel
    #[arg(long)]
    log: Option<PathBuf>,
    /// Column holding per-row image URLs for tooltips
    #[arg(long)]
    images: Option<String>,
    /// Seed for the initial subsample of large tables
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Page title
    #[arg(long, default_value = "Visualizer")]
    title: String,
    /// Also write a static thumbnail (.svg or .png)
    #[arg(long)]
    preview: Option<PathBuf>,
    /// Width of the thumbnail (default 600).
    #[arg(long, default_value_t = 600)]
    width: u32,
    /// Height of the thumbnail (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Export values with their encodings (.csv or .json)
    #[arg(long)]
    export: Option<PathBuf>,
}

/// Column bound to the color or size channel; `None` disables the channel.
#[derive(Clone, Copy, Debug)]
struct Channel(Option<usize>);

fn parse_channel(s: &str) -> Result<Channel, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(Channel(None));
    }
    s.parse::<usize>()
        .map(|i| Channel(Some(i)))
        .map_err(|_| format!("expected a column index or 'none', got '{s}'"))
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Palettes => {
            for p in PaletteName::ALL {
                println!("{p}");
            }
            Ok(())
        }
        Command::Stats { data } => cmd_stats(data),
    }
}

fn cmd_stats(path: PathBuf) -> Result<()> {
    let table = storage::load_csv(&path)?;
    for s in stats::column_summaries(&table) {
        println!(
            "{} [{}]  count={} missing={} distinct={}  min={} max={} mean={} median={}",
            s.name,
            if s.categorical { "categorical" } else { "numeric" },
            s.count,
            s.missing,
            s.distinct,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let table = storage::load_csv(&args.data)?;

    let structure_files = match &args.structure_list {
        Some(list) => storage::read_path_list(list)?,
        None => args.structures.clone(),
    };
    let jsmol = !structure_files.is_empty();
    if jsmol && structure_files.len() != table.n_rows() {
        bail!(
            "{} structure files given for {} rows",
            structure_files.len(),
            table.n_rows()
        );
    }
    if jsmol && !args.no_create_files {
        structures::write_structure_files(&structure_files, args.format, &args.out_dir)?;
    } else if args.no_create_files {
        warn!("structure conversion disabled; the viewer expects existing structures/set{{i}}.xyz files");
    }
    if !jsmol {
        info!("The interface will not have jmol because no structure files were passed in");
    }

    let log = match &args.log {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => ExplorerOptions::default().log,
    };
    let images = match &args.images {
        Some(name) => {
            let col = table
                .column_by_name(name)
                .with_context(|| format!("no column named '{name}' for --images"))?;
            match &col.data {
                ColumnData::Categorical(v) => Some(v.clone()),
                ColumnData::Numeric(_) => bail!("--images column '{name}' holds numbers, not paths"),
            }
        }
        None => None,
    };

    let options = ExplorerOptions {
        palette: args.palette,
        x_index: args.x_index,
        y_index: args.y_index,
        color_index: args.color.0,
        size_index: args.size.0,
        log,
        images,
        seed: args.seed,
    };
    info!("Creating plot, table, and jmol...");
    let data = prepare(&table, &options)?;

    let report_opts = ReportOptions {
        title: args.title.clone(),
        jsmol,
    };
    let page = report::write_report(&args.out_dir, &data, &report_opts)?;
    eprintln!("Wrote explorer to {}", page.display());

    if let Some(path) = args.preview.as_ref() {
        viz::plot_preview(&data, path, args.width, args.height)?;
        eprintln!("Wrote preview to {}", path.display());
    }

    if let Some(path) = args.export.as_ref() {
        let fmt = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_encoded_csv(&data, path)?,
            "json" => storage::save_json(&data, path)?,
            other => bail!("unsupported export format: {}", other),
        }
        eprintln!("Saved {} rows to {}", data.n_rows(), path.display());
    }

    info!("Done.");
    Ok(())
}
