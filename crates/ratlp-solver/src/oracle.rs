use std::fmt;
use std::str::FromStr;

use ratlp_model::LpInstance;
use tracing::debug;

use crate::problem::LpProblem;
use crate::simplex::{EnteringRule, Solver};
use crate::solution::SolutionStatus;

/// Terminal status shared by every oracle and by the solver under test.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IterationLimit,
}

impl OracleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleStatus::Optimal => "optimal",
            OracleStatus::Infeasible => "infeasible",
            OracleStatus::Unbounded => "unbounded",
            OracleStatus::IterationLimit => "iteration-limit",
        }
    }

    /// Whether the status describes the problem rather than a result
    pub fn is_problem_status(&self) -> bool {
        matches!(self, OracleStatus::Infeasible | OracleStatus::Unbounded)
    }
}

impl fmt::Display for OracleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OracleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "optimal" | "feasible" => Ok(OracleStatus::Optimal),
            "infeasible" => Ok(OracleStatus::Infeasible),
            "unbounded" => Ok(OracleStatus::Unbounded),
            "iteration-limit" | "iterations exceeded" => Ok(OracleStatus::IterationLimit),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

impl From<SolutionStatus> for OracleStatus {
    fn from(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal => OracleStatus::Optimal,
            SolutionStatus::Infeasible => OracleStatus::Infeasible,
            SolutionStatus::Unbounded => OracleStatus::Unbounded,
            SolutionStatus::IterationLimit => OracleStatus::IterationLimit,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleResult {
    pub status: OracleStatus,
    /// Present iff `status` is optimal
    pub objective: Option<f64>,
}

impl OracleResult {
    pub fn optimal(objective: f64) -> Self {
        Self {
            status: OracleStatus::Optimal,
            objective: Some(objective),
        }
    }

    pub fn without_value(status: OracleStatus) -> Self {
        Self {
            status,
            objective: None,
        }
    }
}

/// A trusted reference solver.
pub trait Oracle: Send + Sync {
    fn solve(&self, instance: &LpInstance) -> OracleResult;

    /// Oracle name for logging
    fn name(&self) -> &str;
}

/// Reference oracle backed by the floating-point simplex with Bland's rule.
pub struct SimplexOracle {
    solver: Solver,
}

impl Default for SimplexOracle {
    fn default() -> Self {
        Self {
            solver: Solver::new().with_rule(EnteringRule::Bland),
        }
    }
}

impl SimplexOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.solver = self.solver.with_max_iterations(max);
        self
    }

    /// Reduced costs and pivot entries at or below `tol` count as zero.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.solver = self.solver.with_tolerance(tol);
        self
    }
}

impl Oracle for SimplexOracle {
    fn solve(&self, instance: &LpInstance) -> OracleResult {
        let problem = LpProblem::from_instance(instance);
        let solution = self.solver.solve(&problem);
        debug!(
            status = ?solution.status,
            iterations = solution.iterations,
            "reference simplex finished"
        );
        match OracleStatus::from(solution.status) {
            OracleStatus::Optimal => OracleResult::optimal(solution.objective_value),
            status => OracleResult::without_value(status),
        }
    }

    fn name(&self) -> &str {
        "simplex-bland"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip() {
        for status in [
            OracleStatus::Optimal,
            OracleStatus::Infeasible,
            OracleStatus::Unbounded,
            OracleStatus::IterationLimit,
        ] {
            assert_eq!(status.as_str().parse::<OracleStatus>(), Ok(status));
        }
        assert_eq!("feasible".parse::<OracleStatus>(), Ok(OracleStatus::Optimal));
        assert_eq!("iterations exceeded".parse::<OracleStatus>(), Ok(OracleStatus::IterationLimit));
        assert!("solved".parse::<OracleStatus>().is_err());
    }

    #[test]
    fn test_oracle_optimal() {
        // max x + y/2, x + 2y <= 3 -> x = 3
        let instance = LpInstance::parse("2\n1\n1 1/2\n3\n1 2\n").unwrap();
        let result = SimplexOracle::new().solve(&instance);
        assert_eq!(result.status, OracleStatus::Optimal);
        assert!((result.objective.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_oracle_problem_statuses() {
        let infeasible = LpInstance::parse("1\n2\n1\n-5 3\n-1\n1\n").unwrap();
        let result = SimplexOracle::new().solve(&infeasible);
        assert_eq!(result, OracleResult::without_value(OracleStatus::Infeasible));
        assert!(result.status.is_problem_status());

        let unbounded = LpInstance::parse("2\n1\n1 1\n1\n1 -1\n").unwrap();
        let result = SimplexOracle::new().solve(&unbounded);
        assert_eq!(result, OracleResult::without_value(OracleStatus::Unbounded));
    }

    #[test]
    fn test_oracle_agrees_with_generated_classes() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let oracle = SimplexOracle::new();
        let mut rng = StdRng::seed_from_u64(17);
        for (n, m) in [(1, 1), (2, 3), (4, 2), (5, 5)] {
            for _ in 0..5 {
                let infeasible = ratlp_gen::generate_infeasible(&mut rng, n, m).unwrap();
                assert_eq!(oracle.solve(&infeasible.instance).status, OracleStatus::Infeasible);

                let unbounded = ratlp_gen::generate_unbounded(&mut rng, n, m).unwrap();
                assert_eq!(oracle.solve(&unbounded.instance).status, OracleStatus::Unbounded);

                let feasible = ratlp_gen::generate_feasible(&mut rng, n, m).unwrap();
                assert_ne!(oracle.solve(&feasible.instance).status, OracleStatus::Infeasible);
            }
        }

        let cube = ratlp_gen::generate_klee_minty(5).unwrap();
        let result = oracle.solve(&cube.instance);
        assert_eq!(result.status, OracleStatus::Optimal);
        assert!((result.objective.unwrap() - 3125.0).abs() < 1e-6);
    }

    #[test]
    fn test_oracle_tolerance() {
        // max x/1000000 s.t. x <= 1
        let instance = LpInstance::parse("1\n1\n1/1000000\n1\n1\n").unwrap();
        let fine = SimplexOracle::new().solve(&instance);
        assert_eq!(fine.status, OracleStatus::Optimal);
        assert!((fine.objective.unwrap() - 1e-6).abs() < 1e-15);

        // a coarse tolerance treats the reduced cost as zero and stops at x = 0
        let coarse = SimplexOracle::new().with_tolerance(1e-3).solve(&instance);
        assert_eq!(coarse.status, OracleStatus::Optimal);
        assert!(coarse.objective.unwrap().abs() < 1e-15);
    }

    #[test]
    fn test_oracle_iteration_limit() {
        let instance = LpInstance::parse("2\n2\n1 1\n4 4\n1 0\n0 1\n").unwrap();
        let result = SimplexOracle::new().with_max_iterations(1).solve(&instance);
        assert_eq!(result.status, OracleStatus::IterationLimit);
        assert!(result.objective.is_none());
        assert!(!result.status.is_problem_status());
    }
}
