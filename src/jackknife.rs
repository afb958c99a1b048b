// jackknife.rs - Jackknife estimates of thermodynamic observables from raw samples

use crate::error::{AnalysisError, Result};
use crate::measurement::Measurement;
use crate::observables::{ObservableRecord, ObservableTable};

/// Raw measurement series at one temperature.
#[derive(Debug, Clone, Default)]
pub struct ThermalSamples {
    pub temperature: f64,
    /// Total lattice energy H per measurement
    pub energy: Vec<f64>,
    /// |m| per spin per measurement
    pub magnetization: Vec<f64>,
}

/// Leave-one-out means: entry i is the mean of all samples except i.
pub fn jackknife_resample(data: &[f64]) -> Result<Vec<f64>> {
    let n = data.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            computation: "jackknife",
            required: 2,
            found: n,
        });
    }
    let total: f64 = data.iter().sum();
    let others = (n - 1) as f64;
    Ok(data.iter().map(|&x| (total - x) / others).collect())
}

/// Jackknife estimate and error of a derived statistic.
///
/// `estimates` are the statistic evaluated on each leave-one-out resample.
/// Error is sqrt((n-1)/n Σ(θ_i - θ̄)²).
pub fn jackknife_error(estimates: &[f64]) -> Measurement {
    let n = estimates.len() as f64;
    let mean = estimates.iter().sum::<f64>() / n;
    let var = estimates.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() * (n - 1.0) / n;
    Measurement { value: mean, variance: var }
}

/// Reduce one temperature's samples to a table row.
///
/// Per resample: E = <H>, C = (<H²> - <H>²) / (V T²),
/// χ = (<M²> - <M>²) V / T, M = <M>.
pub fn physical_estimates(samples: &ThermalSamples, lattice_volume: usize) -> Result<ObservableRecord> {
    let n = samples.energy.len();
    if samples.magnetization.len() != n {
        return Err(AnalysisError::Config(format!(
            "T = {}: {} energy samples but {} magnetization samples",
            samples.temperature,
            n,
            samples.magnetization.len()
        )));
    }

    let t = samples.temperature;
    let v = lattice_volume as f64;
    let squares = |xs: &[f64]| xs.iter().map(|x| x * x).collect::<Vec<f64>>();

    let h = jackknife_resample(&samples.energy)?;
    let h2 = jackknife_resample(&squares(&samples.energy))?;
    let m = jackknife_resample(&samples.magnetization)?;
    let m2 = jackknife_resample(&squares(&samples.magnetization))?;

    let heat: Vec<f64> = h.iter().zip(&h2)
        .map(|(&h, &h2)| (h2 - h * h) / (v * t * t))
        .collect();
    let chi: Vec<f64> = m.iter().zip(&m2)
        .map(|(&m, &m2)| (m2 - m * m) * v / t)
        .collect();

    Ok(ObservableRecord {
        temperature: t,
        energy: jackknife_error(&h),
        specific_heat: jackknife_error(&heat),
        susceptibility: jackknife_error(&chi),
        magnetization: jackknife_error(&m),
    })
}

/// Build a full table from per-temperature samples given in ascending T.
pub fn tabulate(runs: &[ThermalSamples], lattice_volume: usize) -> Result<ObservableTable> {
    let records = runs
        .iter()
        .map(|s| physical_estimates(s, lattice_volume))
        .collect::<Result<Vec<_>>>()?;
    ObservableTable::new(records)
}
