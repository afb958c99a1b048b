// report.rs - Result files for a finite-size-scaling run

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::analysis::FssReport;
use crate::derived::{self, CollapsePoint, SizeSummary};
use crate::error::{AnalysisError, Result};
use crate::observables::ObservableTable;

pub const TC_CHI_FILE: &str = "Tc_chi.txt";
pub const GAMMA_NU_FILE: &str = "gamma_nu.txt";
pub const BETA_NU_FILE: &str = "beta_nu.txt";
pub const TC_CV_FILE: &str = "Tc_Cv.txt";
pub const ENTROPY_TABLE_FILE: &str = "entropy_table.tex";
pub const SUMMARY_FILE: &str = "fss_summary.csv";
pub const CHI_COLLAPSE_FILE: &str = "collapse_chi.csv";
pub const M_COLLAPSE_FILE: &str = "collapse_m.csv";

/// Per-size entropy and free-energy curve, e.g. `thermo_L16.csv`.
pub fn thermo_file_name(size: usize) -> String {
    format!("thermo_L{size}.csv")
}

pub fn format_scalar(x: f64) -> String {
    format!("{x:.4}\n")
}

/// LaTeX tabular of the high-temperature entropy per size against ln 2.
pub fn entropy_latex_table(summaries: &[SizeSummary]) -> String {
    let ln2 = std::f64::consts::LN_2;
    let mut out = String::new();
    out.push_str("\\begin{tabular}{c|c|c}\n");
    out.push_str("$L$ & $S(T_{\\max})$ & $\\ln 2$ \\\\\n");
    out.push_str("\\hline\n");
    for s in summaries {
        let _ = writeln!(
            out,
            "{} & ${:.4} \\pm {:.4}$ & {:.4} \\\\",
            s.size,
            s.entropy_limit.value,
            s.entropy_limit.std_dev(),
            ln2
        );
    }
    out.push_str("\\end{tabular}\n");
    out
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| AnalysisError::io(path, e))
}

fn write_summary_csv(path: &Path, summaries: &[SizeSummary]) -> Result<()> {
    let csv_err = |source| AnalysisError::Csv { path: path.to_path_buf(), source };
    let mut wtr = WriterBuilder::new().from_path(path).map_err(csv_err)?;

    wtr.write_record([
        "L", "tc_chi", "tc_cv", "chi_max", "chi_max_err", "cv_max", "cv_max_err",
        "m_at_peak", "m_at_peak_err", "entropy_limit", "entropy_limit_err",
        "ln_chi_max", "ln_chi_max_err", "ln_m_at_peak", "ln_m_at_peak_err",
    ]).map_err(csv_err)?;
    for s in summaries {
        let ln_chi = s.chi_peak.ln();
        let ln_m = s.m_at_peak.ln();
        wtr.write_record(&[
            s.size.to_string(),
            s.tc_chi.to_string(), s.tc_cv.to_string(),
            s.chi_peak.value.to_string(), s.chi_peak.std_dev().to_string(),
            s.cv_peak.value.to_string(), s.cv_peak.std_dev().to_string(),
            s.m_at_peak.value.to_string(), s.m_at_peak.std_dev().to_string(),
            s.entropy_limit.value.to_string(), s.entropy_limit.std_dev().to_string(),
            ln_chi.value.to_string(), ln_chi.std_dev().to_string(),
            ln_m.value.to_string(), ln_m.std_dev().to_string(),
        ]).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))
}

fn write_collapse_csv(path: &Path, curves: &[(usize, Vec<CollapsePoint>)]) -> Result<()> {
    let csv_err = |source| AnalysisError::Csv { path: path.to_path_buf(), source };
    let mut wtr = WriterBuilder::new().from_path(path).map_err(csv_err)?;

    wtr.write_record(["L", "x", "y", "y_err"]).map_err(csv_err)?;
    for (size, points) in curves {
        for p in points {
            wtr.write_record(&[
                size.to_string(), p.x.to_string(), p.y.to_string(), p.y_err.to_string(),
            ]).map_err(csv_err)?;
        }
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))
}

/// One row per temperature: T, S, S_err, F_per_spin.
fn write_thermo_csv(path: &Path, table: &ObservableTable, size: usize) -> Result<()> {
    let csv_err = |source| AnalysisError::Csv { path: path.to_path_buf(), source };
    let mut wtr = WriterBuilder::new().from_path(path).map_err(csv_err)?;

    let entropy = derived::entropy(table);
    let free = derived::free_energy_per_spin(table, size);
    wtr.write_record(["T", "S", "S_err", "F_per_spin"]).map_err(csv_err)?;
    for ((t, s), f) in table.temperatures().into_iter().zip(entropy).zip(free) {
        wtr.write_record(&[
            t.to_string(), s.value.to_string(), s.std_dev().to_string(), f.to_string(),
        ]).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))
}

/// Write every result file that the report can support into `dir`,
/// creating it if needed. Fits that failed are skipped (the caller decides
/// whether that is fatal). Returns the paths written.
pub fn write_results(report: &FssReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let mut written = Vec::new();

    let scalars = [
        (TC_CHI_FILE, report.tc_chi.as_ref().map(|f| f.intercept)),
        (GAMMA_NU_FILE, report.gamma_nu.as_ref().map(|r| r.value)),
        (BETA_NU_FILE, report.beta_nu.as_ref().map(|r| r.value)),
        (TC_CV_FILE, report.tc_cv.as_ref().map(|f| f.intercept)),
    ];
    for (name, value) in scalars {
        match value {
            Ok(x) => {
                let path = dir.join(name);
                write_file(&path, &format_scalar(x))?;
                written.push(path);
            }
            Err(e) => log::error!("skipping {name}: {e}"),
        }
    }

    let path = dir.join(ENTROPY_TABLE_FILE);
    write_file(&path, &entropy_latex_table(&report.summaries))?;
    written.push(path);

    let path = dir.join(SUMMARY_FILE);
    write_summary_csv(&path, &report.summaries)?;
    written.push(path);

    for d in &report.data {
        let path = dir.join(thermo_file_name(d.size));
        write_thermo_csv(&path, &d.table, d.size)?;
        written.push(path);
    }

    // ν = 1 for the 2D Ising model.
    if let Ok(gamma_nu) = &report.gamma_nu {
        let path = dir.join(CHI_COLLAPSE_FILE);
        write_collapse_csv(&path, &report.chi_collapse(gamma_nu.value, 1.0))?;
        written.push(path);
    }
    if let Ok(beta_nu) = &report.beta_nu {
        let path = dir.join(M_COLLAPSE_FILE);
        write_collapse_csv(&path, &report.magnetization_collapse(beta_nu.value, 1.0))?;
        written.push(path);
    }

    Ok(written)
}
