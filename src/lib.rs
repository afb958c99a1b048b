pub mod error;
pub mod measurement;
pub mod observables;
pub mod loader;
pub mod derived;
pub mod finite_size;
pub mod jackknife;
pub mod analysis;
pub mod report;
