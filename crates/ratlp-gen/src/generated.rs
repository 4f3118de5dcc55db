use std::fmt;

use num_traits::{Signed, Zero};
use ratlp_model::{BigInt, BigRational, LpInstance, ModelError, dot};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    #[error("Size parameter {name} must be positive")]
    InvalidSize { name: &'static str },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Which outcome a solver must reach on a generated instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeasibilityClass {
    Feasible,
    Infeasible,
    Unbounded,
}

impl fmt::Display for FeasibilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeasibilityClass::Feasible => "feasible",
            FeasibilityClass::Infeasible => "infeasible",
            FeasibilityClass::Unbounded => "unbounded",
        };
        f.write_str(name)
    }
}

/// Certificate proving an instance belongs to its class.
#[derive(Debug, Clone, PartialEq)]
pub enum Witness {
    /// A point with `x >= 0` and `Ax <= b`
    Point(Vec<BigRational>),
    /// A feasible `base` and a `direction` with `d >= 0`, `Ad <= 0`, `cᵗd > 0`
    Ray {
        base: Vec<BigRational>,
        direction: Vec<BigRational>,
    },
    /// A Farkas vector `y >= 0` with `yᵗA >= 0` and `yᵗb < 0`
    Farkas(Vec<BigRational>),
}

#[derive(Debug, Clone)]
pub struct GeneratedInstance {
    pub class: FeasibilityClass,
    pub instance: LpInstance,
    pub witness: Witness,
}

impl GeneratedInstance {
    /// Checks the witness against the instance in exact arithmetic.
    pub fn verify(&self) -> bool {
        let lp = &self.instance;
        match (&self.witness, self.class) {
            (Witness::Point(x), FeasibilityClass::Feasible) => lp.is_feasible_point(x),
            (Witness::Ray { base, direction }, FeasibilityClass::Unbounded) => {
                lp.is_feasible_point(base)
                    && direction.len() == lp.num_variables()
                    && direction.iter().all(|d| !d.is_negative())
                    && lp.a().iter().all(|row| !dot(row, direction).is_positive())
                    && dot(lp.c(), direction).is_positive()
            }
            (Witness::Farkas(y), FeasibilityClass::Infeasible) => {
                if y.len() != lp.num_constraints() || y.iter().any(|v| v.is_negative()) {
                    return false;
                }
                let combined_rows_ok = (0..lp.num_variables()).all(|j| {
                    let column_sum = lp
                        .a()
                        .iter()
                        .zip(y)
                        .fold(BigRational::zero(), |acc, (row, yi)| acc + &row[j] * yi);
                    !column_sum.is_negative()
                });
                combined_rows_ok && dot(y, lp.b()).is_negative()
            }
            _ => false,
        }
    }
}

pub(crate) fn integer(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

pub(crate) fn check_size(value: usize, name: &'static str) -> Result<(), GenError> {
    if value == 0 {
        return Err(GenError::InvalidSize { name });
    }
    Ok(())
}
