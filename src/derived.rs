// derived.rs - Per-size quantities derived from one observable table

use crate::measurement::Measurement;
use crate::observables::{Observable, ObservableTable};

/// Index of the global maximum; the first (lowest-temperature) occurrence
/// wins ties. NaN never wins.
pub fn peak_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some(b) if v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

fn table_peak(table: &ObservableTable, observable: Observable) -> usize {
    // Tables are non-empty, so only an all-NaN column could miss; fall back to the first row.
    peak_index(&table.values(observable)).unwrap_or(0)
}

/// Temperature at which `observable` peaks; the finite-size Tc estimate
/// for susceptibility and specific heat.
pub fn peak_temperature(table: &ObservableTable, observable: Observable) -> f64 {
    table.records()[table_peak(table, observable)].temperature
}

/// Height of the peak, with its error.
pub fn peak_value(table: &ObservableTable, observable: Observable) -> Measurement {
    table.records()[table_peak(table, observable)].get(observable)
}

/// Order parameter at the susceptibility peak.
pub fn magnetization_at_peak(table: &ObservableTable) -> Measurement {
    table.records()[table_peak(table, Observable::Susceptibility)].magnetization
}

/// Cumulative entropy per spin, S(T_i) = Σ_{j=1..i} C_j / T_j (T_j - T_{j-1}).
///
/// The j-th term only carries the error of C_j, so variances simply add.
/// S(T_0) is exactly zero.
pub fn entropy(table: &ObservableTable) -> Vec<Measurement> {
    let records = table.records();
    let mut out = Vec::with_capacity(records.len());
    let mut acc = Measurement::exact(0.0);
    out.push(acc);

    for pair in records.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let dt = cur.temperature - prev.temperature;
        acc = acc + cur.specific_heat / cur.temperature * dt;
        out.push(acc);
    }
    out
}

/// Entropy at the highest sampled temperature. Approaches ln 2 per spin.
pub fn entropy_limit(table: &ObservableTable) -> Measurement {
    entropy(table).last().copied().unwrap_or_default()
}

/// F(T) = E(T) - T S(T) N with N = L², nominal values only.
pub fn free_energy(table: &ObservableTable, size: usize) -> Vec<f64> {
    let n_sites = (size * size) as f64;
    table
        .records()
        .iter()
        .zip(entropy(table))
        .map(|(r, s)| r.energy.value - r.temperature * s.value * n_sites)
        .collect()
}

pub fn free_energy_per_spin(table: &ObservableTable, size: usize) -> Vec<f64> {
    let n_sites = (size * size) as f64;
    free_energy(table, size).into_iter().map(|f| f / n_sites).collect()
}

/// One point of a finite-size data collapse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapsePoint {
    pub x: f64,
    pub y: f64,
    pub y_err: f64,
}

/// Rescale an observable as `L^{-exponent} O` against `L^{1/nu} (T - Tc)`.
///
/// For chi use `exponent = gamma/nu`; for M use `exponent = -beta/nu`.
pub fn scaling_collapse(
    table: &ObservableTable,
    size: usize,
    observable: Observable,
    exponent: f64,
    nu: f64,
    tc: f64,
) -> Vec<CollapsePoint> {
    let l = size as f64;
    let x_scale = l.powf(1.0 / nu);
    let y_scale = l.powf(-exponent);

    table
        .records()
        .iter()
        .map(|r| {
            let y = r.get(observable) * y_scale;
            CollapsePoint {
                x: x_scale * (r.temperature - tc),
                y: y.value,
                y_err: y.std_dev(),
            }
        })
        .collect()
}

/// Per-size scalars that feed the cross-size fits and the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSummary {
    pub size: usize,
    pub tc_chi: f64,
    pub tc_cv: f64,
    pub chi_peak: Measurement,
    pub cv_peak: Measurement,
    pub m_at_peak: Measurement,
    pub entropy_limit: Measurement,
}

impl SizeSummary {
    pub fn from_table(size: usize, table: &ObservableTable) -> Self {
        Self {
            size,
            tc_chi: peak_temperature(table, Observable::Susceptibility),
            tc_cv: peak_temperature(table, Observable::SpecificHeat),
            chi_peak: peak_value(table, Observable::Susceptibility),
            cv_peak: peak_value(table, Observable::SpecificHeat),
            m_at_peak: magnetization_at_peak(table),
            entropy_limit: entropy_limit(table),
        }
    }
}
