mod oracle;
mod problem;
mod simplex;
mod solution;

pub use oracle::{Oracle, OracleResult, OracleStatus, SimplexOracle};
pub use problem::{Constraint, ConstraintOp, LpProblem};
pub use simplex::{EnteringRule, Solver};
pub use solution::{Solution, SolutionStatus};
