use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Dimension mismatch: {what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("Value {0} has no exact rational representation")]
    NotRepresentable(f64),
}

/// Lossless conversion into an exact rational.
///
/// Integers and rationals always convert. Floats convert to the exact value
/// of their binary representation, so `0.25` becomes `1/4` while `0.1`
/// becomes the (long) fraction the double actually stores.
pub trait IntoRational {
    fn into_rational(self) -> Result<BigRational, ModelError>;
}

macro_rules! impl_into_rational_for_int {
    ($($t:ty),*) => {
        $(
            impl IntoRational for $t {
                fn into_rational(self) -> Result<BigRational, ModelError> {
                    Ok(BigRational::from_integer(BigInt::from(self)))
                }
            }
        )*
    };
}

impl_into_rational_for_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl IntoRational for f64 {
    fn into_rational(self) -> Result<BigRational, ModelError> {
        BigRational::from_float(self).ok_or(ModelError::NotRepresentable(self))
    }
}

impl IntoRational for BigInt {
    fn into_rational(self) -> Result<BigRational, ModelError> {
        Ok(BigRational::from_integer(self))
    }
}

impl IntoRational for BigRational {
    fn into_rational(self) -> Result<BigRational, ModelError> {
        Ok(self)
    }
}

impl IntoRational for &BigRational {
    fn into_rational(self) -> Result<BigRational, ModelError> {
        Ok(self.clone())
    }
}

/// Converts a rational to the nearest double, `NaN` if it does not fit.
pub fn rational_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// A linear program `maximize cᵗx subject to Ax <= b, x >= 0` with exact
/// rational coefficients.
///
/// `a` is `m x n`, `b` has `m` entries and `c` has `n` entries. The
/// constructors enforce this, and nothing mutates an instance afterwards.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "InstanceParts"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpInstance {
    a: Vec<Vec<BigRational>>,
    b: Vec<BigRational>,
    c: Vec<BigRational>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct InstanceParts {
    a: Vec<Vec<BigRational>>,
    b: Vec<BigRational>,
    c: Vec<BigRational>,
}

#[cfg(feature = "serde")]
impl TryFrom<InstanceParts> for LpInstance {
    type Error = ModelError;

    fn try_from(parts: InstanceParts) -> Result<Self, Self::Error> {
        LpInstance::from_rationals(parts.a, parts.b, parts.c)
    }
}

impl LpInstance {
    /// Builds an instance from anything convertible to exact rationals.
    pub fn new<T, I, R>(a: I, b: impl IntoIterator<Item = T>, c: impl IntoIterator<Item = T>) -> Result<Self, ModelError>
    where
        T: IntoRational,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
    {
        let a = a
            .into_iter()
            .map(|row| row.into_iter().map(IntoRational::into_rational).collect())
            .collect::<Result<Vec<Vec<_>>, _>>()?;
        let b = b.into_iter().map(IntoRational::into_rational).collect::<Result<Vec<_>, _>>()?;
        let c = c.into_iter().map(IntoRational::into_rational).collect::<Result<Vec<_>, _>>()?;
        Self::from_rationals(a, b, c)
    }

    pub fn from_rationals(
        a: Vec<Vec<BigRational>>,
        b: Vec<BigRational>,
        c: Vec<BigRational>,
    ) -> Result<Self, ModelError> {
        if a.len() != b.len() {
            return Err(ModelError::DimensionMismatch {
                what: "rows of A".to_string(),
                expected: b.len(),
                found: a.len(),
            });
        }
        for (i, row) in a.iter().enumerate() {
            if row.len() != c.len() {
                return Err(ModelError::DimensionMismatch {
                    what: format!("row {} of A", i),
                    expected: c.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { a, b, c })
    }

    pub fn a(&self) -> &[Vec<BigRational>] {
        &self.a
    }

    pub fn b(&self) -> &[BigRational] {
        &self.b
    }

    pub fn c(&self) -> &[BigRational] {
        &self.c
    }

    /// `n`, the number of columns of A
    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    /// `m`, the number of rows of A
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Float copy of `(A, b, c)`, for solvers that work in `f64`.
    pub fn to_f64(&self) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
        let a = self
            .a
            .iter()
            .map(|row| row.iter().map(rational_to_f64).collect())
            .collect();
        let b = self.b.iter().map(rational_to_f64).collect();
        let c = self.c.iter().map(rational_to_f64).collect();
        (a, b, c)
    }

    /// Checks `x >= 0` and `Ax <= b` exactly.
    pub fn is_feasible_point(&self, x: &[BigRational]) -> bool {
        if x.len() != self.num_variables() || x.iter().any(|v| v < &BigRational::zero()) {
            return false;
        }
        self.a
            .iter()
            .zip(&self.b)
            .all(|(row, rhs)| &dot(row, x) <= rhs)
    }

    /// Exact objective value `cᵗx`.
    pub fn objective_at(&self, x: &[BigRational]) -> BigRational {
        dot(&self.c, x)
    }
}

/// Exact dot product over the shorter of the two slices.
pub fn dot(lhs: &[BigRational], rhs: &[BigRational]) -> BigRational {
    lhs.iter()
        .zip(rhs)
        .fold(BigRational::zero(), |acc, (l, r)| acc + l * r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_new_from_integers() {
        let lp = LpInstance::new(vec![vec![1, 2], vec![3, 4]], vec![5, 6], vec![7, 8]).unwrap();
        assert_eq!(lp.num_variables(), 2);
        assert_eq!(lp.num_constraints(), 2);
        assert_eq!(lp.a()[1][0], q(3, 1));
        assert_eq!(lp.c()[1], q(8, 1));
    }

    #[test]
    fn test_new_from_floats_is_exact() {
        let lp = LpInstance::new(vec![vec![0.5, 1.25]], vec![2.75], vec![-0.125, 3.0]).unwrap();
        assert_eq!(lp.a()[0][1], q(5, 4));
        assert_eq!(lp.b()[0], q(11, 4));
        assert_eq!(lp.c()[0], q(-1, 8));
    }

    #[test]
    fn test_rejects_nan() {
        let err = LpInstance::new(vec![vec![1.0]], vec![f64::NAN], vec![1.0]).unwrap_err();
        assert!(matches!(err, ModelError::NotRepresentable(_)));
    }

    #[test]
    fn test_rejects_ragged_matrix() {
        let err = LpInstance::new(vec![vec![1, 2], vec![3]], vec![1, 1], vec![1, 1]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                what: "row 1 of A".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let err = LpInstance::new(vec![vec![1, 2]], vec![1, 1], vec![1, 1]).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_feasible_point() {
        // x + 2y <= 3
        let lp = LpInstance::new(vec![vec![1, 2]], vec![3], vec![1, 1]).unwrap();
        assert!(lp.is_feasible_point(&[q(1, 1), q(1, 1)]));
        assert!(!lp.is_feasible_point(&[q(2, 1), q(1, 1)]));
        assert!(!lp.is_feasible_point(&[q(-1, 1), q(0, 1)]));
        assert_eq!(lp.objective_at(&[q(1, 2), q(1, 3)]), q(5, 6));
    }

    #[test]
    fn test_to_f64() {
        let lp = LpInstance::new(vec![vec![q(1, 4)]], vec![q(3, 2)], vec![q(-7, 8)]).unwrap();
        let (a, b, c) = lp.to_f64();
        assert_eq!(a, vec![vec![0.25]]);
        assert_eq!(b, vec![1.5]);
        assert_eq!(c, vec![-0.875]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_dimensions() {
        let lp = LpInstance::new(vec![vec![q(1, 4), q(2, 1)]], vec![q(3, 2)], vec![q(-7, 8), q(1, 1)]).unwrap();
        let mut value = serde_json::to_value(&lp).unwrap();
        let back: LpInstance = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, lp);

        value["c"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<LpInstance>(value).is_err());
    }
}
