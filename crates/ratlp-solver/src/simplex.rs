use tracing::trace;

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Solution, SolutionStatus};

/// How the entering column is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnteringRule {
    /// Most positive reduced cost (Dantzig)
    #[default]
    Dantzig,
    /// Lowest-index improving column, lowest-index leaving variable on ties.
    /// Never cycles.
    Bland,
}

/// Dense two-phase tableau simplex over `f64`
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    rule: EnteringRule,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            rule: EnteringRule::Dantzig,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_rule(mut self, rule: EnteringRule) -> Self {
        self.rule = rule;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        let mut tableau = self.build_tableau(problem);
        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                SimplexResult::Optimal => {}
                SimplexResult::IterationLimit => return Solution::iteration_limit(iterations),
                SimplexResult::Infeasible | SimplexResult::Unbounded => {
                    return Solution::infeasible(iterations);
                }
            }
        }

        // Phase 2: Optimize, never letting an artificial re-enter
        let eligible = tableau.n_vars + tableau.n_slack;
        match self.iterate(&mut tableau, eligible, &mut iterations) {
            SimplexResult::Optimal => self.extract_solution(&tableau, problem, iterations),
            SimplexResult::Unbounded => Solution::unbounded(iterations),
            SimplexResult::IterationLimit => Solution::iteration_limit(iterations),
            SimplexResult::Infeasible => Solution::infeasible(iterations),
        }
    }

    fn build_tableau(&self, problem: &LpProblem) -> Tableau {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        // Rows with a negative RHS are negated first, which turns <= into >=
        let normalized: Vec<(f64, ConstraintOp)> = problem
            .constraints
            .iter()
            .map(|c| match (c.rhs < 0.0, c.op) {
                (false, op) => (1.0, op),
                (true, ConstraintOp::Le) => (-1.0, ConstraintOp::Ge),
                (true, ConstraintOp::Ge) => (-1.0, ConstraintOp::Le),
            })
            .collect();

        // Every row gets a slack or surplus, >= rows also an artificial
        let n_slack = n_constraints;
        let n_artificial = normalized.iter().filter(|(_, op)| *op == ConstraintOp::Ge).count();

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut artificial_idx = n_vars + n_slack;
        for (i, (c, &(sign, op))) in problem.constraints.iter().zip(&normalized).enumerate() {
            for (j, &coef) in c.coefficients.iter().enumerate() {
                tableau.data[i][j] = sign * coef;
            }
            tableau.data[i][total_cols - 1] = sign * c.rhs;

            let slack_idx = n_vars + i;
            match op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row) holds the reduced profits; positive entries
        // can still improve the maximum
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.iter().enumerate() {
            tableau.data[obj_row][j] = coef;
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> SimplexResult {
        // Auxiliary objective: maximize -sum(artificials)
        let n_constraints = tableau.data.len() - 1;
        let n_cols = tableau.data[0].len();
        let art_start = tableau.n_vars + tableau.n_slack;

        let orig_obj = tableau.data[n_constraints].clone();

        for j in 0..n_cols {
            tableau.data[n_constraints][j] = 0.0;
        }
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }

        // Price out the basic artificials
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1, iterations) {
            SimplexResult::Optimal => {}
            other => return other,
        }

        let rhs_col = n_cols - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > self.tolerance {
                return SimplexResult::Infeasible;
            }
        }

        // Artificials still basic sit at zero; swap them for any structural
        // column so phase 2 cannot push them off zero. Rows with no such
        // column are redundant and stay untouched.
        for i in 0..n_constraints {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                self.pivot(tableau, i, col);
            }
        }

        // Restore original objective and adjust for basic variables
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            if tableau.data[n_constraints][basic].abs() > self.tolerance {
                let ratio = tableau.data[n_constraints][basic];
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        SimplexResult::Optimal
    }

    /// Pivots until optimal or unbounded, considering columns `0..eligible`.
    fn iterate(&self, tableau: &mut Tableau, eligible: usize, iterations: &mut usize) -> SimplexResult {
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, eligible) else {
                return SimplexResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return SimplexResult::Unbounded;
            };
            if *iterations >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }
            trace!(row = pivot_row, col = pivot_col, "pivot");
            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, eligible: usize) -> Option<usize> {
        let obj = &tableau.data[tableau.data.len() - 1];
        match self.rule {
            EnteringRule::Bland => (0..eligible).find(|&j| obj[j] > self.tolerance),
            EnteringRule::Dantzig => {
                let mut max_val = self.tolerance;
                let mut max_col = None;
                for j in 0..eligible {
                    if obj[j] > max_val {
                        max_val = obj[j];
                        max_col = Some(j);
                    }
                }
                max_col
            }
        }
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..n_constraints {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col] / val;
            let better = match min_row {
                None => true,
                Some(current) => {
                    ratio < min_ratio - self.tolerance
                        || (self.rule == EnteringRule::Bland
                            && (ratio - min_ratio).abs() <= self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[current])
                }
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        let n_cols = tableau.data[0].len();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        for i in 0..n_rows {
            if i != row {
                let factor = tableau.data[i][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n_cols {
                    tableau.data[i][j] -= factor * tableau.data[row][j];
                }
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem, iterations: usize) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.data[0].len() - 1;

        let mut values = vec![0.0; n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                values[basic] = tableau.data[i][rhs_col];
            }
        }

        let objective_value = problem
            .objective
            .iter()
            .zip(&values)
            .map(|(c, x)| c * x)
            .sum();

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
        }
    }
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

enum SimplexResult {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(vec![3.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);
    }

    #[test]
    fn test_negative_rhs_needs_phase1() {
        // Maximize: -2x - 3y  (minimize 2x + 3y)
        // Subject to:
        //   -x - y <= -4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=-9
        let mut problem = LpProblem::new(vec![-2.0, -3.0]);
        problem.add_constraint(vec![-1.0, -1.0], ConstraintOp::Le, -4.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        for rule in [EnteringRule::Dantzig, EnteringRule::Bland] {
            let solution = Solver::new().with_rule(rule).solve(&problem);
            assert_eq!(solution.status, SolutionStatus::Optimal, "{:?}", rule);
            assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
            assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
            assert!((solution.objective_value + 9.0).abs() < 1e-6, "obj = {} (expected -9)", solution.objective_value);
        }
    }

    #[test]
    fn test_ge_constraint() {
        // Maximize: -x - y, x + 2y >= 2, x <= 1
        // Optimal: x=0, y=1, obj=-1
        let mut problem = LpProblem::new(vec![-1.0, -1.0]);
        problem.add_constraint(vec![1.0, 2.0], ConstraintOp::Ge, 2.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value + 1.0).abs() < 1e-6, "obj = {}", solution.objective_value);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = LpProblem::new(vec![1.0]);
        problem.add_constraint(vec![-1.0], ConstraintOp::Le, -5.0);
        problem.add_constraint(vec![1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        // Maximize x + y, x - y <= 1
        let mut problem = LpProblem::new(vec![1.0, 1.0]);
        problem.add_constraint(vec![1.0, -1.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert_eq!(solution.objective_value, f64::INFINITY);
    }

    #[test]
    fn test_unconstrained_zero_objective() {
        let problem = LpProblem::new(vec![-1.0, 0.0]);
        let solution = Solver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.objective_value, 0.0);
        assert_eq!(solution.iterations, 0);
    }

    fn klee_minty(n: usize) -> LpProblem {
        let mut problem = LpProblem::new((0..n).map(|i| 2f64.powi((n - i - 1) as i32)).collect());
        for i in 0..n {
            let row = (0..n)
                .map(|j| match j {
                    j if j < i => 2f64.powi((i - j + 1) as i32),
                    j if j == i => 1.0,
                    _ => 0.0,
                })
                .collect();
            problem.add_constraint(row, ConstraintOp::Le, 5f64.powi(i as i32 + 1));
        }
        problem
    }

    #[test]
    fn test_klee_minty_dantzig_visits_every_vertex() {
        for n in 1..=6 {
            let solution = Solver::new().solve(&klee_minty(n));
            assert_eq!(solution.status, SolutionStatus::Optimal);
            assert!((solution.objective_value - 5f64.powi(n as i32)).abs() < 1e-6);
            assert_eq!(solution.iterations, (1 << n) - 1, "n = {}", n);
        }
    }

    #[test]
    fn test_iteration_limit() {
        let solution = Solver::new().with_max_iterations(3).solve(&klee_minty(4));
        assert_eq!(solution.status, SolutionStatus::IterationLimit);
        assert_eq!(solution.iterations, 3);
        assert!(solution.objective_value.is_nan());
    }

    fn beale() -> LpProblem {
        // Beale's cycling example, written as a maximization
        let mut problem = LpProblem::new(vec![0.75, -150.0, 0.02, -6.0]);
        problem.add_constraint(vec![0.25, -60.0, -0.04, 9.0], ConstraintOp::Le, 0.0);
        problem.add_constraint(vec![0.5, -90.0, -0.02, 3.0], ConstraintOp::Le, 0.0);
        problem.add_constraint(vec![0.0, 0.0, 1.0, 0.0], ConstraintOp::Le, 1.0);
        problem
    }

    #[test]
    fn test_degenerate_bland_terminates() {
        let solution = Solver::new().with_rule(EnteringRule::Bland).solve(&beale());
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 0.05).abs() < 1e-6, "obj = {}", solution.objective_value);
    }

    #[test]
    fn test_degenerate_dantzig_cycles() {
        let solution = Solver::new().with_max_iterations(100).solve(&beale());
        assert_eq!(solution.status, SolutionStatus::IterationLimit);
    }
}
