// analysis.rs - Finite-size-scaling pipeline over a series of lattice sizes

use std::path::PathBuf;

use rayon::prelude::*;

use crate::derived::{scaling_collapse, CollapsePoint, SizeSummary};
use crate::error::{AnalysisError, Result};
use crate::finite_size::{
    beta_over_nu, extrapolate_tc, gamma_over_nu, specific_heat_log_amplitude, ExponentRatio,
    LinearFit,
};
use crate::loader::{load_size, FileNaming};
use crate::measurement::Measurement;
use crate::observables::{Observable, ObservableTable};

/// Ordered lattice sizes L analysed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSeries(Vec<usize>);

impl SizeSeries {
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(AnalysisError::Config("size series is empty".into()));
        }
        if sizes.contains(&0) {
            return Err(AnalysisError::Config("lattice size must be positive".into()));
        }
        for (i, l) in sizes.iter().enumerate() {
            if sizes[..i].contains(l) {
                return Err(AnalysisError::Config(format!("size {l} listed twice")));
            }
        }
        Ok(Self(sizes))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SizeSeries {
    fn default() -> Self {
        Self(vec![10, 16, 24, 36, 50])
    }
}

/// Run-time configuration (single source of truth).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub sizes: SizeSeries,
    pub naming: FileNaming,
    pub results_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sizes: SizeSeries::default(),
            naming: FileNaming::default(),
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Table for one lattice size.
#[derive(Debug, Clone)]
pub struct SizeData {
    pub size: usize,
    pub table: ObservableTable,
}

/// Load every size's table in parallel. Output order matches `sizes`;
/// the first failure aborts the whole load. `on_loaded` fires once per size.
pub fn load_tables<F>(sizes: &SizeSeries, naming: &FileNaming, on_loaded: F) -> Result<Vec<SizeData>>
where
    F: Fn(usize) + Sync + Send,
{
    naming.validate()?;
    sizes
        .as_slice()
        .par_iter()
        .map(|&size| {
            let table = load_size(naming, size)?;
            on_loaded(size);
            Ok(SizeData { size, table })
        })
        .collect()
}

/// Everything one run produces. Each cross-size fit is kept as its own
/// `Result` so an insufficient-data failure only takes out that fit.
#[derive(Debug)]
pub struct FssReport {
    pub data: Vec<SizeData>,
    pub summaries: Vec<SizeSummary>,
    pub tc_chi: Result<LinearFit>,
    pub tc_cv: Result<LinearFit>,
    pub gamma_nu: Result<ExponentRatio>,
    pub beta_nu: Result<ExponentRatio>,
    pub cv_amplitude: Result<LinearFit>,
}

impl FssReport {
    pub fn from_data(data: Vec<SizeData>) -> Self {
        let summaries: Vec<SizeSummary> = data
            .iter()
            .map(|d| SizeSummary::from_table(d.size, &d.table))
            .collect();
        for s in &summaries {
            log::debug!(
                "L = {}: Tc(chi) = {:.4}, Tc(C) = {:.4}, chi_max = {:.4}",
                s.size, s.tc_chi, s.tc_cv, s.chi_peak
            );
        }

        let sizes: Vec<usize> = summaries.iter().map(|s| s.size).collect();
        let tc_chi: Vec<f64> = summaries.iter().map(|s| s.tc_chi).collect();
        let tc_cv: Vec<f64> = summaries.iter().map(|s| s.tc_cv).collect();
        let chi_peaks: Vec<Measurement> = summaries.iter().map(|s| s.chi_peak).collect();
        let m_at_peak: Vec<Measurement> = summaries.iter().map(|s| s.m_at_peak).collect();
        let cv_peaks: Vec<Measurement> = summaries.iter().map(|s| s.cv_peak).collect();

        Self {
            tc_chi: extrapolate_tc(&sizes, &tc_chi),
            tc_cv: extrapolate_tc(&sizes, &tc_cv),
            gamma_nu: gamma_over_nu(&sizes, &chi_peaks),
            beta_nu: beta_over_nu(&sizes, &m_at_peak),
            cv_amplitude: specific_heat_log_amplitude(&sizes, &cv_peaks),
            summaries,
            data,
        }
    }

    /// First failure among the four fits the report files depend on.
    pub fn required_fits(&self) -> std::result::Result<(), &AnalysisError> {
        self.tc_chi.as_ref().map(|_| ())?;
        self.tc_cv.as_ref().map(|_| ())?;
        self.gamma_nu.as_ref().map(|_| ())?;
        self.beta_nu.as_ref().map(|_| ())?;
        Ok(())
    }

    /// χ collapse: L^{-γ/ν} χ against L^{1/ν} (T - Tc(L)), Tc(L) from the χ peak.
    pub fn chi_collapse(&self, gamma_nu: f64, nu: f64) -> Vec<(usize, Vec<CollapsePoint>)> {
        self.collapse(Observable::Susceptibility, gamma_nu, nu)
    }

    /// Magnetization collapse: L^{β/ν} M against L^{1/ν} (T - Tc(L)).
    pub fn magnetization_collapse(&self, beta_nu: f64, nu: f64) -> Vec<(usize, Vec<CollapsePoint>)> {
        self.collapse(Observable::Magnetization, -beta_nu, nu)
    }

    fn collapse(&self, observable: Observable, exponent: f64, nu: f64) -> Vec<(usize, Vec<CollapsePoint>)> {
        self.data
            .iter()
            .zip(&self.summaries)
            .map(|(d, s)| {
                (d.size, scaling_collapse(&d.table, d.size, observable, exponent, nu, s.tc_chi))
            })
            .collect()
    }
}

/// Load all tables and run every per-size and cross-size computation.
pub fn run(config: &AnalysisConfig) -> Result<FssReport> {
    let data = load_tables(&config.sizes, &config.naming, |_| {})?;
    log::info!("loaded {} tables", data.len());
    Ok(FssReport::from_data(data))
}
