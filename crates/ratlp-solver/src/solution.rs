/// Outcome of one simplex run
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    /// Primal values, empty unless optimal
    pub values: Vec<f64>,
    /// `-inf` when infeasible, `+inf` when unbounded, `NaN` at the iteration limit
    pub objective_value: f64,
    /// Pivots performed across both phases
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The pivot budget ran out before termination
    IterationLimit,
}

impl Solution {
    pub fn infeasible(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            iterations,
        }
    }

    pub fn unbounded(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            iterations,
        }
    }

    pub fn iteration_limit(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::IterationLimit,
            values: Vec::new(),
            objective_value: f64::NAN,
            iterations,
        }
    }
}
