use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// Pivot rules understood by the solver under test, passed as `--pivot <rule>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotRule {
    Bland,
    Random,
    MaxIncrease,
    MaxCoef,
}

impl PivotRule {
    pub const ALL: [PivotRule; 4] = [
        PivotRule::Bland,
        PivotRule::Random,
        PivotRule::MaxIncrease,
        PivotRule::MaxCoef,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PivotRule::Bland => "bland",
            PivotRule::Random => "random",
            PivotRule::MaxIncrease => "maxincrease",
            PivotRule::MaxCoef => "maxcoef",
        }
    }
}

impl fmt::Display for PivotRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PivotRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PivotRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = PivotRule::ALL.iter().map(PivotRule::as_str).collect();
                format!("invalid pivot rule '{}', allowed values are {{{}}}", s, allowed.join(","))
            })
    }
}

/// Settings for one validation run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Solver binary under test
    solver: PathBuf,
    /// Arguments placed before the instance path, e.g. a script for an interpreter
    solver_args: Vec<String>,
    /// Directory holding the serialized instances
    inputs: PathBuf,
    pivot_rules: Vec<PivotRule>,
    /// Largest accepted relative objective difference
    tolerance: f64,
    /// Worker threads running trials
    jobs: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::from("./build/RationaLP"),
            solver_args: Vec::new(),
            inputs: PathBuf::from("inputs"),
            pivot_rules: PivotRule::ALL.to_vec(),
            tolerance: 0.01,
            jobs: 1,
        }
    }
}

impl HarnessConfig {
    pub fn new(solver: impl Into<PathBuf>) -> Self {
        Self {
            solver: solver.into(),
            ..Self::default()
        }
    }

    pub fn with_solver_args(mut self, args: Vec<String>) -> Self {
        self.solver_args = args;
        self
    }

    pub fn with_inputs(mut self, inputs: impl Into<PathBuf>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn with_pivot_rules(mut self, rules: Vec<PivotRule>) -> Self {
        self.pivot_rules = rules;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn solver(&self) -> &Path {
        &self.solver
    }

    pub fn solver_args(&self) -> &[String] {
        &self.solver_args
    }

    pub fn inputs(&self) -> &Path {
        &self.inputs
    }

    pub fn pivot_rules(&self) -> &[PivotRule] {
        &self.pivot_rules
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }
}
