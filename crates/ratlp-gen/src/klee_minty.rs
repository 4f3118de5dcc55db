use ratlp_model::{BigInt, BigRational, LpInstance};

use crate::generated::{FeasibilityClass, GenError, GeneratedInstance, Witness, integer};

fn power(base: u32, exponent: usize) -> BigRational {
    BigRational::from_integer(BigInt::from(base).pow(exponent as u32))
}

/// Klee–Minty cube in dimension `n`.
///
/// `A[i][j] = 2^(i-j+1)` below and on the diagonal, minus the identity,
/// `b[i] = 5^(i+1)` and `c[i] = 2^(n-i-1)`. The optimum is `5^n`, reached
/// only after `2^n - 1` pivots under Dantzig's largest-coefficient rule.
pub fn generate_klee_minty(n: usize) -> Result<GeneratedInstance, GenError> {
    let a: Vec<Vec<BigRational>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| match j {
                    j if j < i => power(2, i - j + 1),
                    j if j == i => power(2, 1) - integer(1),
                    _ => integer(0),
                })
                .collect()
        })
        .collect();
    let b: Vec<BigRational> = (0..n).map(|i| power(5, i + 1)).collect();
    let c: Vec<BigRational> = (0..n).map(|i| power(2, n - i - 1)).collect();

    Ok(GeneratedInstance {
        class: FeasibilityClass::Feasible,
        instance: LpInstance::from_rationals(a, b, c)?,
        witness: Witness::Point(vec![integer(0); n]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<BigRational> {
        values.iter().map(|&v| integer(v)).collect()
    }

    #[test]
    fn test_three_dimensional_cube() {
        let generated = generate_klee_minty(3).unwrap();
        let lp = &generated.instance;
        assert_eq!(lp.a(), &[ints(&[1, 0, 0]), ints(&[4, 1, 0]), ints(&[8, 4, 1])]);
        assert_eq!(lp.b(), ints(&[5, 25, 125]).as_slice());
        assert_eq!(lp.c(), ints(&[4, 2, 1]).as_slice());
        assert!(generated.verify());
    }

    #[test]
    fn test_optimum_vertex() {
        // x = (0, ..., 0, 5^n) is the optimal vertex with value 5^n
        let n = 5;
        let lp = generate_klee_minty(n).unwrap().instance;
        let mut x = vec![integer(0); n];
        x[n - 1] = power(5, n);
        assert!(lp.is_feasible_point(&x));
        assert_eq!(lp.objective_at(&x), power(5, n));
    }

    #[test]
    fn test_large_dimension_stays_exact() {
        let lp = generate_klee_minty(40).unwrap().instance;
        assert_eq!(lp.b()[39], power(5, 40));
        assert_eq!(lp.a()[39][0], power(2, 40));
        assert_eq!(lp.c()[0], power(2, 39));
    }

    #[test]
    fn test_empty_cube() {
        let lp = generate_klee_minty(0).unwrap().instance;
        assert_eq!(lp.num_variables(), 0);
        assert_eq!(lp.num_constraints(), 0);
    }
}
