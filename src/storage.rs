use crate::models::{Column, Table};
use crate::prepare::PreparedData;
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use log::info;
use num_format::{Locale, ToFormattedString};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Load a CSV file with a header row into a [`Table`].
///
/// A column is numeric when every non-empty cell parses as a number; empty
/// cells of numeric columns become `NaN`. Any other column is categorical.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let table = read_csv(f).with_context(|| format!("reading {}", path.display()))?;
    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows().to_formatted_string(&Locale::en),
        table.n_columns(),
        path.display()
    );
    Ok(table)
}

/// Same as [`load_csv`], from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        bail!("CSV has no header row");
    }
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("record {}", i + 1))?;
        if rec.len() != headers.len() {
            bail!(
                "record {} has {} fields, header has {}",
                i + 1,
                rec.len(),
                headers.len()
            );
        }
        for (col, cell) in cells.iter_mut().zip(rec.iter()) {
            col.push(cell.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Table::new(columns)
}

fn infer_column(name: String, raw: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|s| {
            if s.is_empty() {
                Some(f64::NAN)
            } else {
                s.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(values) if raw.iter().any(|s| !s.is_empty()) => Column::numeric(name, values),
        _ => Column::categorical(name, raw),
    }
}

/// Read a list of paths, one per line. Blank lines and `#` comments are skipped;
/// relative entries resolve against the list file's directory.
pub fn read_path_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| {
            let p = Path::new(l);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        })
        .collect())
}

/// Prefix cells that spreadsheet programs would evaluate as formulas.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') if s.parse::<f64>().is_err() => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save the original values next to their encodings as CSV with header.
///
/// For every column `name` three fields are written: `name`, `name_color`
/// (palette index) and `name_size` (marker size).
pub fn save_encoded_csv<P: AsRef<Path>>(data: &PreparedData, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let mut header = Vec::with_capacity(data.columns.len() * 3);
    for name in &data.columns {
        header.push(sanitize_cell(name));
        header.push(sanitize_cell(&format!("{name}_color")));
        header.push(sanitize_cell(&format!("{name}_size")));
    }
    wtr.write_record(&header)?;
    for row in 0..data.n_rows() {
        let mut rec = Vec::with_capacity(header.len());
        for (i, col) in data.originals.iter().enumerate() {
            rec.push(sanitize_cell(&col.data.display_cell(row)));
            rec.push(data.colors[i][row].to_string());
            rec.push(data.sizes[i][row].to_string());
        }
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the prepared data as pretty JSON.
pub fn save_json<P: AsRef<Path>>(data: &PreparedData, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(data)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnData;
    use tempfile::tempdir;

    #[test]
    fn infers_column_kinds() {
        let csv = "energy,phase,gap\n1.5,alpha,\n-2,beta,0.3\n3e2,alpha,0.1\n";
        let t = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(t.names(), vec!["energy", "phase", "gap"]);
        assert_eq!(
            t.column(0).unwrap().data,
            ColumnData::Numeric(vec![1.5, -2.0, 300.0])
        );
        assert!(t.column(1).unwrap().data.is_categorical());
        match &t.column(2).unwrap().data {
            ColumnData::Numeric(v) => {
                assert!(v[0].is_nan());
                assert_eq!(&v[1..], &[0.3, 0.1]);
            }
            other => panic!("expected numeric, got {other:?}"),
        }
    }

    #[test]
    fn all_empty_column_is_categorical() {
        let t = read_csv("a,b\n1,\n2,\n".as_bytes()).unwrap();
        assert!(t.column(1).unwrap().data.is_categorical());
    }

    #[test]
    fn path_list_resolves_relative_entries() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("files.txt");
        fs::write(&list, "# structures\ngeo0.in\n\n/abs/geo1.in\n").unwrap();
        let paths = read_path_list(&list).unwrap();
        assert_eq!(paths, vec![dir.path().join("geo0.in"), PathBuf::from("/abs/geo1.in")]);
    }

    #[test]
    fn formula_cells_are_prefixed() {
        assert_eq!(sanitize_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_cell("-3.5"), "-3.5");
        assert_eq!(sanitize_cell("plain"), "plain");
    }
}
