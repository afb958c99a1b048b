// finite_size.rs - Cross-size fits for critical temperature and exponent ratios

use nalgebra::{DMatrix, DVector};

use crate::error::{AnalysisError, NumericWarning, Result};
use crate::measurement::Measurement;

/// Exact 2D Ising critical temperature, 2 / ln(1 + √2).
pub const ONSAGER_TC: f64 = 2.269_185_314_213_022;
/// Exact 2D Ising γ/ν.
pub const EXACT_GAMMA_OVER_NU: f64 = 1.75;
/// Exact 2D Ising β/ν.
pub const EXACT_BETA_OVER_NU: f64 = 0.125;

/// Ordinary least-squares fit of y = slope * x + intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// NaN when there are no residual degrees of freedom
    pub slope_err: f64,
    pub intercept_err: f64,
    pub r_squared: f64,
    pub n_points: usize,
    pub warnings: Vec<NumericWarning>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn slope_measurement(&self) -> Measurement {
        Measurement::new(self.slope, self.slope_err)
    }

    pub fn intercept_measurement(&self) -> Measurement {
        Measurement::new(self.intercept, self.intercept_err)
    }
}

/// An exponent ratio read off a log-log slope.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentRatio {
    pub value: f64,
    pub fit: LinearFit,
    /// Fitted points (ln L, ln peak), the peak error propagated through ln
    pub points: Vec<(f64, Measurement)>,
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted: Vec<f64> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Fit `points` by least squares. `computation` names the fit in errors and logs.
pub fn linear_fit(points: &[(f64, f64)], computation: &'static str) -> Result<LinearFit> {
    let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    let found = distinct_count(&xs);
    if found < 2 {
        return Err(AnalysisError::InsufficientData {
            computation,
            required: 2,
            found,
        });
    }

    let n = points.len();
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { points[i].0 } else { 1.0 });
    let y = DVector::from_iterator(n, points.iter().map(|(_, y)| *y));

    let mut warnings = Vec::new();
    let xtx = design.transpose() * &design;
    let Some(xtx_inv) = xtx.try_inverse() else {
        log::warn!("{computation}: {}", NumericWarning::NonFiniteResult);
        return Ok(LinearFit {
            slope: f64::NAN,
            intercept: f64::NAN,
            slope_err: f64::NAN,
            intercept_err: f64::NAN,
            r_squared: f64::NAN,
            n_points: n,
            warnings: vec![NumericWarning::NonFiniteResult],
        });
    };
    let beta = &xtx_inv * design.transpose() * &y;
    let (slope, intercept) = (beta[0], beta[1]);

    let residuals = &y - &design * &beta;
    let ss_res = residuals.norm_squared();
    let y_mean = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    let (slope_err, intercept_err) = if n > 2 {
        let s2 = ss_res / (n - 2) as f64;
        ((s2 * xtx_inv[(0, 0)]).sqrt(), (s2 * xtx_inv[(1, 1)]).sqrt())
    } else {
        warnings.push(NumericWarning::ExactFit);
        (f64::NAN, f64::NAN)
    };

    if !slope.is_finite() || !intercept.is_finite() {
        warnings.push(NumericWarning::NonFiniteResult);
    }
    for w in &warnings {
        log::warn!("{computation}: {w}");
    }

    Ok(LinearFit {
        slope,
        intercept,
        slope_err,
        intercept_err,
        r_squared,
        n_points: n,
        warnings,
    })
}

fn check_lengths(sizes: &[usize], n_values: usize, computation: &str) -> Result<()> {
    if sizes.len() != n_values {
        return Err(AnalysisError::Config(format!(
            "{computation}: {} sizes but {} values",
            sizes.len(),
            n_values
        )));
    }
    Ok(())
}

/// Fit Tc(L) against 1/L; the intercept is the L → ∞ critical temperature.
pub fn extrapolate_tc(sizes: &[usize], tcs: &[f64]) -> Result<LinearFit> {
    check_lengths(sizes, tcs.len(), "Tc extrapolation")?;
    let points: Vec<(f64, f64)> = sizes
        .iter()
        .zip(tcs)
        .map(|(&l, &tc)| (1.0 / l as f64, tc))
        .collect();
    linear_fit(&points, "Tc extrapolation")
}

fn log_log_fit(
    sizes: &[usize],
    peaks: &[Measurement],
    computation: &'static str,
) -> Result<(LinearFit, Vec<(f64, Measurement)>)> {
    check_lengths(sizes, peaks.len(), computation)?;
    let non_positive = peaks.iter().any(|p| p.value <= 0.0);
    let points: Vec<(f64, Measurement)> = sizes
        .iter()
        .zip(peaks)
        .map(|(&l, p)| ((l as f64).ln(), p.ln()))
        .collect();
    let nominal: Vec<(f64, f64)> = points.iter().map(|(x, y)| (*x, y.value)).collect();

    let mut fit = linear_fit(&nominal, computation)?;
    if non_positive {
        log::warn!("{computation}: {}", NumericWarning::NonPositiveLogArgument);
        fit.warnings.push(NumericWarning::NonPositiveLogArgument);
    }
    Ok((fit, points))
}

/// χ_max ~ L^{γ/ν}: γ/ν is the log-log slope of the susceptibility peak heights.
pub fn gamma_over_nu(sizes: &[usize], chi_peaks: &[Measurement]) -> Result<ExponentRatio> {
    let (fit, points) = log_log_fit(sizes, chi_peaks, "gamma/nu fit")?;
    Ok(ExponentRatio { value: fit.slope, fit, points })
}

/// M(Tc(L)) ~ L^{-β/ν}, so β/ν is minus the log-log slope.
pub fn beta_over_nu(sizes: &[usize], m_at_peak: &[Measurement]) -> Result<ExponentRatio> {
    let (fit, points) = log_log_fit(sizes, m_at_peak, "beta/nu fit")?;
    Ok(ExponentRatio { value: -fit.slope, fit, points })
}

/// C_max ~ A ln L for the 2D Ising model (α = 0); returns the linear fit
/// of peak height against ln L, slope = A.
pub fn specific_heat_log_amplitude(sizes: &[usize], cv_peaks: &[Measurement]) -> Result<LinearFit> {
    check_lengths(sizes, cv_peaks.len(), "specific heat amplitude")?;
    let points: Vec<(f64, f64)> = sizes
        .iter()
        .zip(cv_peaks)
        .map(|(&l, c)| ((l as f64).ln(), c.value))
        .collect();
    linear_fit(&points, "specific heat amplitude")
}
