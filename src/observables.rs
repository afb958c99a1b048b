// observables.rs - Per-size observable tables for phase transition analysis

use crate::error::{AnalysisError, Result};
use crate::measurement::Measurement;

/// Column selector for the fluctuation observables of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observable {
    Energy,
    SpecificHeat,
    Susceptibility,
    Magnetization,
}

impl Observable {
    pub const ALL: [Observable; 4] = [
        Observable::Energy,
        Observable::SpecificHeat,
        Observable::Susceptibility,
        Observable::Magnetization,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Observable::Energy => "energy",
            Observable::SpecificHeat => "specific heat",
            Observable::Susceptibility => "susceptibility",
            Observable::Magnetization => "magnetization",
        }
    }
}

/// One temperature sample of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObservableRecord {
    pub temperature: f64,
    /// Total lattice energy
    pub energy: Measurement,
    /// Specific heat per spin
    pub specific_heat: Measurement,
    pub susceptibility: Measurement,
    /// Mean |m| per spin
    pub magnetization: Measurement,
}

impl ObservableRecord {
    pub fn get(&self, observable: Observable) -> Measurement {
        match observable {
            Observable::Energy => self.energy,
            Observable::SpecificHeat => self.specific_heat,
            Observable::Susceptibility => self.susceptibility,
            Observable::Magnetization => self.magnetization,
        }
    }
}

/// All temperature samples for a single lattice size, ascending in T.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservableTable {
    records: Vec<ObservableRecord>,
}

impl ObservableTable {
    /// Validate and wrap a set of records. Rejects empty tables and
    /// temperatures that are not strictly ascending.
    pub fn new(records: Vec<ObservableRecord>) -> Result<Self> {
        check_records(&records).map_err(|(line, reason)| AnalysisError::parse("<table>", line, reason))?;
        Ok(Self { records })
    }

    /// Like `new`, but reports problems against a source file.
    pub(crate) fn from_file_records(
        path: &std::path::Path,
        records: Vec<ObservableRecord>,
        lines: &[usize],
    ) -> Result<Self> {
        check_records(&records).map_err(|(idx, reason)| {
            let line = if idx == 0 { 0 } else { lines[idx - 1] };
            AnalysisError::parse(path, line, reason)
        })?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ObservableRecord] {
        &self.records
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn column(&self, observable: Observable) -> Vec<Measurement> {
        self.records.iter().map(|r| r.get(observable)).collect()
    }

    /// Nominal values only.
    pub fn values(&self, observable: Observable) -> Vec<f64> {
        self.records.iter().map(|r| r.get(observable).value).collect()
    }

    pub fn errors(&self, observable: Observable) -> Vec<f64> {
        self.records.iter().map(|r| r.get(observable).std_dev()).collect()
    }
}

/// Returns (1-based record index or 0, reason) on failure.
fn check_records(records: &[ObservableRecord]) -> std::result::Result<(), (usize, String)> {
    if records.is_empty() {
        return Err((0, "table has no rows".to_string()));
    }
    for (i, pair) in records.windows(2).enumerate() {
        if !(pair[1].temperature > pair[0].temperature) {
            return Err((
                i + 2,
                format!(
                    "temperatures must be strictly ascending ({} after {})",
                    pair[1].temperature, pair[0].temperature
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(t: f64) -> ObservableRecord {
        ObservableRecord {
            temperature: t,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_empty_and_unsorted() {
        assert!(ObservableTable::new(vec![]).is_err());
        assert!(ObservableTable::new(vec![record(1.0), record(1.0)]).is_err());
        assert!(ObservableTable::new(vec![record(2.0), record(1.0)]).is_err());
        assert!(ObservableTable::new(vec![record(1.0), record(2.0)]).is_ok());
    }

    #[test]
    fn columns_follow_named_fields() {
        let mut r = record(1.5);
        r.susceptibility = Measurement::new(4.0, 0.5);
        let table = ObservableTable::new(vec![r]).unwrap();
        assert_eq!(table.values(Observable::Susceptibility), vec![4.0]);
        assert_eq!(table.errors(Observable::Susceptibility), vec![0.5]);
        assert_eq!(table.temperatures(), vec![1.5]);
    }
}
