use ratlp_model::LpInstance;

/// A linear program in floating point: maximize `objectiveᵗx` subject to the
/// constraints and `x >= 0`.
#[derive(Debug, Clone)]
pub struct LpProblem {
    pub objective: Vec<f64>,
    pub constraints: Vec<Constraint>,
}

/// `coefficientsᵗx (op) rhs`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Le,
    Ge,
}

impl LpProblem {
    pub fn new(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    /// Float image of an exact instance, one `<=` row per constraint.
    pub fn from_instance(instance: &LpInstance) -> Self {
        let (a, b, c) = instance.to_f64();
        let mut problem = Self::new(c);
        for (row, rhs) in a.into_iter().zip(b) {
            problem.add_constraint(row, ConstraintOp::Le, rhs);
        }
        problem
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint { coefficients, op, rhs });
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
