// loader.rs - Read and write whitespace-delimited observable tables

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::measurement::Measurement;
use crate::observables::{ObservableRecord, ObservableTable};

/// Columns per row: T, E, C, chi, M, then the four standard errors.
pub const N_COLUMNS: usize = 9;

const PLACEHOLDER: &str = "{L}";

/// Where the table for a given lattice size lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub input_dir: PathBuf,
    pub pattern: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            pattern: "L{L}output.txt".to_string(),
        }
    }
}

impl FileNaming {
    pub fn new(input_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Result<Self> {
        let naming = Self {
            input_dir: input_dir.into(),
            pattern: pattern.into(),
        };
        naming.validate()?;
        Ok(naming)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pattern.contains(PLACEHOLDER) {
            return Err(AnalysisError::Config(format!(
                "file pattern '{}' has no {PLACEHOLDER} placeholder",
                self.pattern
            )));
        }
        Ok(())
    }

    pub fn path_for(&self, size: usize) -> PathBuf {
        self.input_dir
            .join(self.pattern.replace(PLACEHOLDER, &size.to_string()))
    }
}

/// Parse one observable table. Blank lines and `#` comments are skipped.
pub fn read_table(path: &Path) -> Result<ObservableTable> {
    let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;

    let mut records = Vec::new();
    let mut lines = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let fields = content
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| AnalysisError::parse(path, line_no, format!("'{tok}' is not a number")))
            })
            .collect::<Result<Vec<f64>>>()?;

        records.push(parse_row(path, line_no, &fields)?);
        lines.push(line_no);
    }

    let table = ObservableTable::from_file_records(path, records, &lines)?;
    log::debug!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

fn parse_row(path: &Path, line: usize, fields: &[f64]) -> Result<ObservableRecord> {
    if fields.len() != N_COLUMNS {
        return Err(AnalysisError::parse(
            path,
            line,
            format!("expected {N_COLUMNS} columns, found {}", fields.len()),
        ));
    }
    if let Some(bad) = fields.iter().find(|x| !x.is_finite()) {
        return Err(AnalysisError::parse(path, line, format!("non-finite value {bad}")));
    }
    if fields[5..].iter().any(|&e| e < 0.0) {
        return Err(AnalysisError::parse(path, line, "negative standard error"));
    }
    // Errors are stored as variances; a non-zero σ must square to a finite non-zero value.
    if let Some(bad) = fields[5..].iter().find(|&&e| !(e * e).is_finite() || (e > 0.0 && e * e == 0.0)) {
        return Err(AnalysisError::parse(
            path,
            line,
            format!("standard error {bad:e} out of representable range"),
        ));
    }

    Ok(ObservableRecord {
        temperature: fields[0],
        energy: Measurement::new(fields[1], fields[5]),
        specific_heat: Measurement::new(fields[2], fields[6]),
        susceptibility: Measurement::new(fields[3], fields[7]),
        magnetization: Measurement::new(fields[4], fields[8]),
    })
}

/// Load the table for one lattice size.
pub fn load_size(naming: &FileNaming, size: usize) -> Result<ObservableTable> {
    read_table(&naming.path_for(size))
}

/// Render a table in the input format. Temperatures and values use
/// shortest round-trip formatting and read back identically; errors are
/// written as sqrt(σ²) and read back within rounding.
pub fn format_table(table: &ObservableTable) -> String {
    let mut out = String::new();
    for r in table.records() {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {} {} {}",
            r.temperature,
            r.energy.value,
            r.specific_heat.value,
            r.susceptibility.value,
            r.magnetization.value,
            r.energy.std_dev(),
            r.specific_heat.std_dev(),
            r.susceptibility.std_dev(),
            r.magnetization.std_dev(),
        );
    }
    out
}

pub fn write_table(path: &Path, table: &ObservableTable) -> Result<()> {
    fs::write(path, format_table(table)).map_err(|e| AnalysisError::io(path, e))
}
