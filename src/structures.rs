//! Atomic structure files for the 3D viewer.
//!
//! Reads FHI-aims `geometry.in` and (extended) XYZ files, and writes extended
//! XYZ, which is what the viewer loads as `structures/set{i}.xyz`.

use clap::ValueEnum;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Directory, relative to the page, holding the converted structures.
pub const STRUCTURE_DIR: &str = "structures";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// FHI-aims `geometry.in`
    #[default]
    Aims,
    /// Plain or extended XYZ
    Xyz,
}

#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("fractional coordinates need three lattice vectors")]
    MissingLattice,
    #[error("expected 3 lattice vectors, found {found}")]
    LatticeCount { found: usize },
    #[error("header announces {expected} atoms, found {found}")]
    AtomCount { expected: usize, found: usize },
    #[error("structure contains no atoms")]
    Empty,
}

fn parse_err(line: usize, message: impl Into<String>) -> StructureError {
    StructureError::Parse {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    /// Cartesian position in Angstrom.
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    /// Cell vectors as rows, when periodic.
    pub lattice: Option<[[f64; 3]; 3]>,
}

fn parse_vec3(fields: &[&str], line: usize) -> Result<[f64; 3], StructureError> {
    if fields.len() < 3 {
        return Err(parse_err(line, "expected three coordinates"));
    }
    let mut out = [0.0; 3];
    for (o, f) in out.iter_mut().zip(fields) {
        *o = f
            .parse()
            .map_err(|_| parse_err(line, format!("invalid number '{f}'")))?;
    }
    Ok(out)
}

/// Parse an FHI-aims geometry.
///
/// Understands `lattice_vector`, `atom` and `atom_frac`; other keywords
/// (`initial_moment`, `constrain_relaxation`, ...) are skipped.
pub fn parse_aims(text: &str) -> Result<Structure, StructureError> {
    let mut lattice: Vec<[f64; 3]> = Vec::new();
    let mut cartesian: Vec<Atom> = Vec::new();
    // (index into atoms, fractional coordinates); resolved once the cell is known
    let mut fractional: Vec<(usize, [f64; 3])> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let fields: Vec<&str> = content.split_whitespace().collect();
        let Some((&keyword, rest)) = fields.split_first() else {
            continue;
        };
        match keyword {
            "lattice_vector" => lattice.push(parse_vec3(rest, line_no)?),
            "atom" | "atom_frac" => {
                let pos = parse_vec3(rest, line_no)?;
                let symbol = rest
                    .get(3)
                    .ok_or_else(|| parse_err(line_no, "missing species"))?;
                if keyword == "atom_frac" {
                    fractional.push((cartesian.len(), pos));
                }
                cartesian.push(Atom {
                    symbol: symbol.to_string(),
                    position: pos,
                });
            }
            _ => {}
        }
    }

    if cartesian.is_empty() {
        return Err(StructureError::Empty);
    }
    let lattice = match lattice.len() {
        0 => None,
        3 => Some([lattice[0], lattice[1], lattice[2]]),
        found => return Err(StructureError::LatticeCount { found }),
    };
    if !fractional.is_empty() {
        let cell = lattice.ok_or(StructureError::MissingLattice)?;
        for (idx, f) in fractional {
            cartesian[idx].position = frac_to_cartesian(f, &cell);
        }
    }
    Ok(Structure {
        atoms: cartesian,
        lattice,
    })
}

fn frac_to_cartesian(f: [f64; 3], cell: &[[f64; 3]; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (k, o) in out.iter_mut().enumerate() {
        *o = f[0] * cell[0][k] + f[1] * cell[1][k] + f[2] * cell[2][k];
    }
    out
}

fn lattice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)lattice\s*=\s*"([^"]*)""#).expect("static regex"))
}

/// Parse a plain or extended XYZ file (first frame only).
pub fn parse_xyz(text: &str) -> Result<Structure, StructureError> {
    let mut lines = text.lines();
    let count_line = lines.next().ok_or(StructureError::Empty)?;
    let count: usize = count_line
        .trim()
        .parse()
        .map_err(|_| parse_err(1, format!("invalid atom count '{}'", count_line.trim())))?;
    if count == 0 {
        return Err(StructureError::Empty);
    }
    let comment = lines.next().unwrap_or("");

    let lattice = match lattice_regex().captures(comment) {
        Some(cap) => {
            let nums: Vec<f64> = cap[1]
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| parse_err(2, "invalid Lattice entry"))?;
            if nums.len() != 9 {
                return Err(parse_err(2, "Lattice needs nine numbers"));
            }
            Some([
                [nums[0], nums[1], nums[2]],
                [nums[3], nums[4], nums[5]],
                [nums[6], nums[7], nums[8]],
            ])
        }
        None => None,
    };

    let mut atoms = Vec::with_capacity(count);
    for (i, raw) in lines.take(count).enumerate() {
        let line_no = i + 3;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        let Some((symbol, rest)) = fields.split_first() else {
            return Err(parse_err(line_no, "empty atom line"));
        };
        atoms.push(Atom {
            symbol: symbol.to_string(),
            position: parse_vec3(rest, line_no)?,
        });
    }
    if atoms.len() != count {
        return Err(StructureError::AtomCount {
            expected: count,
            found: atoms.len(),
        });
    }
    Ok(Structure { atoms, lattice })
}

impl Structure {
    pub fn parse(text: &str, format: StructureFormat) -> Result<Self, StructureError> {
        match format {
            StructureFormat::Aims => parse_aims(text),
            StructureFormat::Xyz => parse_xyz(text),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P, format: StructureFormat) -> Result<Self, StructureError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StructureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, format)
    }

    /// Serialize as extended XYZ.
    pub fn to_xyz(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.atoms.len());
        match &self.lattice {
            Some(cell) => {
                let flat: Vec<String> = cell.iter().flatten().map(|v| format!("{v}")).collect();
                let _ = writeln!(
                    out,
                    "Lattice=\"{}\" Properties=species:S:1:pos:R:3 pbc=\"T T T\"",
                    flat.join(" ")
                );
            }
            None => {
                let _ = writeln!(out, "Properties=species:S:1:pos:R:3 pbc=\"F F F\"");
            }
        }
        for a in &self.atoms {
            let [x, y, z] = a.position;
            let _ = writeln!(out, "{:<2} {:>16.8} {:>16.8} {:>16.8}", a.symbol, x, y, z);
        }
        out
    }
}

/// Path of the converted structure for row `index`, relative to the page.
pub fn structure_path(index: usize) -> String {
    format!("{STRUCTURE_DIR}/set{index}.xyz")
}

/// Convert every input file to `out_dir/structures/set{i}.xyz`, in order.
pub fn write_structure_files<P: AsRef<Path>>(
    files: &[PathBuf],
    format: StructureFormat,
    out_dir: P,
) -> Result<Vec<PathBuf>, StructureError> {
    let dir = out_dir.as_ref().join(STRUCTURE_DIR);
    fs::create_dir_all(&dir).map_err(|source| StructureError::Io {
        path: dir.clone(),
        source,
    })?;
    info!("Making structure files for visualizer...");
    let mut written = Vec::with_capacity(files.len());
    for (i, src) in files.iter().enumerate() {
        let structure = Structure::read(src, format).map_err(|e| match e {
            StructureError::Parse { line, message } => StructureError::Parse {
                line,
                message: format!("{}: {message}", src.display()),
            },
            other => other,
        })?;
        let dest = out_dir.as_ref().join(structure_path(i));
        fs::write(&dest, structure.to_xyz()).map_err(|source| StructureError::Io {
            path: dest.clone(),
            source,
        })?;
        written.push(dest);
    }
    Ok(written)
}
