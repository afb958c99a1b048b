use std::fs;
use std::path::Path;

use ising_fss::analysis::{load_tables, run, AnalysisConfig, FssReport, SizeSeries};
use ising_fss::derived;
use ising_fss::error::AnalysisError;
use ising_fss::loader::{write_table, FileNaming};
use ising_fss::measurement::Measurement;
use ising_fss::observables::{ObservableRecord, ObservableTable};
use ising_fss::report::{self, write_results};

const T_MIN: f64 = 1.0;
const T_STEP: f64 = 0.01;
const N_TEMPS: usize = 301;

/// A table whose χ peak sits at 2.0 + 0.4/L with height 3 L^{7/4}, whose
/// C peak sits at 2.0 + 0.8/L with height ln L + 1, and whose magnetization
/// at the χ peak is 2 L^{-1/8}.
fn synthetic_table(size: usize) -> ObservableTable {
    let l = size as f64;
    let chi_idx = ((2.0 + 0.4 / l - T_MIN) / T_STEP).round() as i64;
    let cv_idx = ((2.0 + 0.8 / l - T_MIN) / T_STEP).round() as i64;

    let records = (0..N_TEMPS as i64)
        .map(|i| {
            let t = T_MIN + T_STEP * i as f64;
            let d_chi = (i - chi_idx) as f64 * T_STEP * l;
            let d_cv = (i - cv_idx) as f64 * T_STEP * l;
            let chi = 3.0 * l.powf(1.75) / (1.0 + d_chi * d_chi);
            let cv = (l.ln() + 1.0) / (1.0 + d_cv * d_cv);
            let m = 2.0 * l.powf(-0.125) * (1.0 - 0.001 * (i - chi_idx) as f64);
            ObservableRecord {
                temperature: t,
                energy: Measurement::new((-2.0 + 0.5 * t) * l * l, 0.1),
                specific_heat: Measurement::new(cv, 0.01),
                susceptibility: Measurement::new(chi, 0.05 * chi),
                magnetization: Measurement::new(m, 0.001),
            }
        })
        .collect();
    ObservableTable::new(records).unwrap()
}

fn write_inputs(dir: &Path, sizes: &[usize]) {
    for &l in sizes {
        write_table(&dir.join(format!("L{l}output.txt")), &synthetic_table(l)).unwrap();
    }
}

fn config(dir: &Path, sizes: Vec<usize>) -> AnalysisConfig {
    AnalysisConfig {
        sizes: SizeSeries::new(sizes).unwrap(),
        naming: FileNaming::new(dir, "L{L}output.txt").unwrap(),
        results_dir: dir.join("results"),
    }
}

#[test]
fn test_full_run_recovers_synthetic_exponents() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![10, 20, 40];
    write_inputs(dir.path(), &sizes);

    let report = run(&config(dir.path(), sizes.clone())).unwrap();
    assert!(report.required_fits().is_ok());

    let order: Vec<usize> = report.summaries.iter().map(|s| s.size).collect();
    assert_eq!(order, sizes, "summaries must follow the size series");

    let tc_chi = report.tc_chi.as_ref().unwrap();
    assert!((tc_chi.intercept - 2.0).abs() < 1e-8, "Tc(chi) = {}", tc_chi.intercept);
    assert!((tc_chi.slope - 0.4).abs() < 1e-6);

    let tc_cv = report.tc_cv.as_ref().unwrap();
    assert!((tc_cv.intercept - 2.0).abs() < 1e-8, "Tc(C) = {}", tc_cv.intercept);

    let gamma = report.gamma_nu.as_ref().unwrap();
    assert!((gamma.value - 1.75).abs() < 1e-10, "gamma/nu = {}", gamma.value);

    let beta = report.beta_nu.as_ref().unwrap();
    assert!((beta.value - 0.125).abs() < 1e-10, "beta/nu = {}", beta.value);

    let amp = report.cv_amplitude.as_ref().unwrap();
    assert!((amp.slope - 1.0).abs() < 1e-10);
}

#[test]
fn test_results_directory_contents() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![10, 20, 40];
    write_inputs(dir.path(), &sizes);
    let cfg = config(dir.path(), sizes);

    let report = run(&cfg).unwrap();
    let written = write_results(&report, &cfg.results_dir).unwrap();
    // four scalars, tex table, summary, three thermo curves, two collapses
    assert_eq!(written.len(), 11);

    let read = |name: &str| fs::read_to_string(cfg.results_dir.join(name)).unwrap();
    assert_eq!(read(report::TC_CHI_FILE), "2.0000\n");
    assert_eq!(read(report::TC_CV_FILE), "2.0000\n");
    assert_eq!(read(report::GAMMA_NU_FILE), "1.7500\n");
    assert_eq!(read(report::BETA_NU_FILE), "0.1250\n");

    let tex = read(report::ENTROPY_TABLE_FILE);
    assert_eq!(tex.matches("\\\\").count(), 4, "header plus three size rows");
    assert!(tex.contains("\n40 & $"));

    let mut rdr = csv::Reader::from_path(cfg.results_dir.join(report::SUMMARY_FILE)).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "10");
    // χ errors are 5% of the peak, so ln χ_max carries σ = 0.05.
    let ln_chi_err: f64 = rows[0][12].parse().unwrap();
    assert!((ln_chi_err - 0.05).abs() < 1e-9, "ln chi_max err = {ln_chi_err}");

    let mut rdr = csv::Reader::from_path(cfg.results_dir.join(report::CHI_COLLAPSE_FILE)).unwrap();
    assert_eq!(rdr.records().count(), 3 * N_TEMPS);
}

#[test]
fn test_thermo_curves_follow_entropy_and_free_energy() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![10, 20];
    write_inputs(dir.path(), &sizes);
    let cfg = config(dir.path(), sizes);

    let report = run(&cfg).unwrap();
    write_results(&report, &cfg.results_dir).unwrap();

    let path = cfg.results_dir.join(report::thermo_file_name(10));
    let mut rdr = csv::Reader::from_path(&path).unwrap();
    assert_eq!(rdr.headers().unwrap(), vec!["T", "S", "S_err", "F_per_spin"]);
    let rows: Vec<Vec<f64>> = rdr
        .records()
        .map(|r| r.unwrap().iter().map(|x| x.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), N_TEMPS);

    // S starts at zero, so F/N is E/N = -2 + 0.5 T at the lowest T.
    assert_eq!(rows[0], vec![T_MIN, 0.0, 0.0, -1.5]);

    let table = synthetic_table(10);
    let entropy = derived::entropy(&table);
    for (row, s) in rows.iter().zip(&entropy).skip(1) {
        let t = row[0];
        assert!((row[1] - s.value).abs() < 1e-12, "S at T = {t}");
        assert!((row[2] - s.std_dev()).abs() < 1e-12, "S_err at T = {t}");
        let expected = (-2.0 + 0.5 * t) - t * s.value;
        assert!((row[3] - expected).abs() < 1e-9, "F/N at T = {t}: {} vs {expected}", row[3]);
    }
    assert!(entropy[N_TEMPS - 1].std_dev() > 0.0, "entropy error accumulates");

    assert!(cfg.results_dir.join(report::thermo_file_name(20)).exists());
}

#[test]
fn test_chi_collapse_lines_up_peaks() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![10, 20, 40];
    write_inputs(dir.path(), &sizes);
    let report = run(&config(dir.path(), sizes)).unwrap();

    // With exact exponents every rescaled peak sits at x = 0 with height 3.
    for (size, points) in report.chi_collapse(1.75, 1.0) {
        let peak = points
            .iter()
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        assert!(peak.x.abs() < 1e-9, "L = {size}: peak at x = {}", peak.x);
        assert!((peak.y - 3.0).abs() < 1e-9, "L = {size}: height {}", peak.y);
    }
}

#[test]
fn test_single_size_only_fails_the_fits() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &[16]);
    let cfg = config(dir.path(), vec![16]);

    let report = run(&cfg).unwrap();
    assert_eq!(report.summaries.len(), 1);
    assert!(matches!(report.tc_chi, Err(AnalysisError::InsufficientData { .. })));
    assert!(matches!(report.gamma_nu, Err(AnalysisError::InsufficientData { .. })));
    assert!(report.required_fits().is_err());

    // Per-size outputs are still produced.
    let written = write_results(&report, &cfg.results_dir).unwrap();
    assert!(written.iter().any(|p| p.ends_with(report::ENTROPY_TABLE_FILE)));
    assert!(written.iter().any(|p| p.ends_with(report::thermo_file_name(16))));
    assert!(!cfg.results_dir.join(report::TC_CHI_FILE).exists());
}

#[test]
fn test_missing_size_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &[10, 20]);

    let err = run(&config(dir.path(), vec![10, 20, 40])).unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("L40output.txt"));
}

#[test]
fn test_load_reports_each_size_once() {
    use std::sync::Mutex;

    let dir = tempfile::tempdir().unwrap();
    let sizes = vec![10, 16, 24, 36, 50];
    write_inputs(dir.path(), &sizes);
    let cfg = config(dir.path(), sizes.clone());

    let seen = Mutex::new(Vec::new());
    let data = load_tables(&cfg.sizes, &cfg.naming, |l| seen.lock().unwrap().push(l)).unwrap();

    let order: Vec<usize> = data.iter().map(|d| d.size).collect();
    assert_eq!(order, sizes);
    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    assert_eq!(seen, sizes);

    let report = FssReport::from_data(data);
    assert!(report.required_fits().is_ok());
}
