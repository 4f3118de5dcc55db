mod compare;
mod config;
mod error;
mod output;
mod runner;
mod stats;

pub use compare::{Discrepancy, Verdict, compare, relative_difference};
pub use config::{HarnessConfig, PivotRule};
pub use error::{HarnessError, OutputError, TrialError};
pub use output::{SolverReport, parse_output};
pub use runner::{SuiteReport, Trial, TrialOutcome, collect_instances, run_suite, run_trial};
pub use stats::{StatsLog, TrialRecord};
