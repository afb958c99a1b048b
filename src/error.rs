// error.rs - Error taxonomy for the finite-size-scaling pipeline

use std::fmt;
use std::path::PathBuf;

/// Fatal failures. `Io` and `Parse` abort a run; `InsufficientData`
/// aborts only the computation that raised it.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line number, 0 when the problem concerns the whole file.
        line: usize,
        reason: String,
    },

    #[error("cannot write {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{computation} needs at least {required} distinct sizes, got {found}")]
    InsufficientData {
        computation: &'static str,
        required: usize,
        found: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// True for missing or malformed input files.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}

/// Non-fatal conditions raised while fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericWarning {
    /// Two points, zero residual degrees of freedom: parameter errors undefined.
    ExactFit,
    /// Slope or intercept came out NaN or infinite.
    NonFiniteResult,
    /// A log-log fit was handed a value <= 0.
    NonPositiveLogArgument,
}

impl fmt::Display for NumericWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactFit => write!(f, "exact fit through two points, no parameter errors"),
            Self::NonFiniteResult => write!(f, "fit produced a non-finite parameter"),
            Self::NonPositiveLogArgument => write!(f, "logarithm of a non-positive value"),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
