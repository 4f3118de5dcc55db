use std::path::PathBuf;

use ratlp_model::FormatError;
use thiserror::Error;

use crate::compare::Discrepancy;
use crate::config::PivotRule;

/// Why the solver's stdout could not be decoded
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    #[error("output matches neither 'infeasible|unbounded' nor '{pattern}'")]
    MissingPattern { pattern: &'static str },
    #[error("invalid objective value '{0}'")]
    InvalidObjective(String),
    #[error("invalid pivot count '{0}'")]
    InvalidPivots(String),
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("status is optimal but no 'objective:' line was given")]
    MissingObjective,
}

/// Failure of a single (instance, pivot rule) trial
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("{instance}: unusable instance: {source}")]
    Instance {
        instance: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("{instance} [{rule}]: cannot launch {solver}: {source}")]
    Launch {
        instance: PathBuf,
        rule: PivotRule,
        solver: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{instance} [{rule}]: {source}")]
    Output {
        instance: PathBuf,
        rule: PivotRule,
        #[source]
        source: OutputError,
    },
    #[error("{instance} [{rule}]: {discrepancy}")]
    Disagreement {
        instance: PathBuf,
        rule: PivotRule,
        discrepancy: Discrepancy,
    },
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Cannot read inputs directory {path}: {source}")]
    Inputs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stats log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot encode stats record: {0}")]
    Encode(#[from] serde_json::Error),
}
