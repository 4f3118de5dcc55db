use std::fmt;

use ratlp_solver::{OracleResult, OracleStatus};

use crate::output::SolverReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// The oracle itself gave up, so there is nothing to compare against
    Inconclusive,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    Status {
        expected: OracleStatus,
        actual: OracleStatus,
    },
    Objective {
        expected: f64,
        actual: f64,
        relative: f64,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Status { expected, actual } => {
                write!(f, "expected status {}, solver reported {}", expected, actual)
            }
            Discrepancy::Objective {
                expected,
                actual,
                relative,
            } => write!(
                f,
                "expected objective {}, solver reported {} (relative difference {:.4})",
                expected, actual, relative
            ),
        }
    }
}

/// Optima smaller than this in magnitude are compared absolutely
const ZERO_OPTIMUM: f64 = 1e-12;

/// `|actual - expected| / |expected|`, or `|actual - expected|` when the
/// expected optimum is zero.
pub fn relative_difference(actual: f64, expected: f64) -> f64 {
    let diff = (actual - expected).abs();
    if expected.abs() < ZERO_OPTIMUM {
        diff
    } else {
        diff / expected.abs()
    }
}

/// Reconciles the solver's report with the oracle's result.
///
/// An objective passes when its relative difference is at most `tolerance`;
/// the boundary itself is accepted.
pub fn compare(expected: &OracleResult, actual: &SolverReport, tolerance: f64) -> Result<Verdict, Discrepancy> {
    let status_mismatch = || Discrepancy::Status {
        expected: expected.status,
        actual: actual.status,
    };
    match expected.status {
        OracleStatus::IterationLimit => Ok(Verdict::Inconclusive),
        OracleStatus::Infeasible | OracleStatus::Unbounded => {
            if actual.status == expected.status {
                Ok(Verdict::Pass)
            } else {
                Err(status_mismatch())
            }
        }
        OracleStatus::Optimal => {
            let (Some(expected_value), Some(actual_value)) = (expected.objective, actual.objective_f64()) else {
                return Err(status_mismatch());
            };
            let relative = relative_difference(actual_value, expected_value);
            // NaN compares false, so an unrepresentable value fails here too
            if relative <= tolerance {
                Ok(Verdict::Pass)
            } else {
                Err(Discrepancy::Objective {
                    expected: expected_value,
                    actual: actual_value,
                    relative,
                })
            }
        }
    }
}
