//! Random instances whose class follows from how they are built.
//!
//! Feasible and unbounded instances carry the point (or ray) they were built
//! around. Infeasible instances are the negated transpose of an unbounded
//! one, so the source's ray becomes a Farkas certificate.

use num_traits::{Signed, Zero};
use rand::Rng;
use ratlp_model::{BigInt, BigRational, LpInstance, dot};

use crate::generated::{FeasibilityClass, GenError, GeneratedInstance, Witness, check_size, integer};

fn random_vector<R: Rng + ?Sized>(rng: &mut R, len: usize, low: i64, high: i64) -> Vec<BigRational> {
    (0..len).map(|_| integer(rng.gen_range(low..high))).collect()
}

/// Nonnegative slack in steps of 1/4, added to `b` so that the witness does
/// not always sit exactly on the constraint.
fn perturbation<R: Rng + ?Sized>(rng: &mut R) -> BigRational {
    BigRational::new(BigInt::from(rng.gen_range(0..4i64)), BigInt::from(4))
}

fn rhs_above<R: Rng + ?Sized>(rng: &mut R, a: &[Vec<BigRational>], point: &[BigRational]) -> Vec<BigRational> {
    a.iter().map(|row| dot(row, point) + perturbation(rng)).collect()
}

/// Feasible instance with `n` variables and `m` constraints.
///
/// A random point `v >= 0` is drawn first, then `b = Av + slack`, which makes
/// `v` feasible whatever `A` and `c` are.
pub fn generate_feasible<R: Rng + ?Sized>(rng: &mut R, n: usize, m: usize) -> Result<GeneratedInstance, GenError> {
    check_size(n, "n")?;
    check_size(m, "m")?;
    let (ni, mi) = (n as i64, m as i64);

    let v = random_vector(rng, n, 0, 2 * ni);
    let a: Vec<Vec<BigRational>> = (0..m).map(|_| random_vector(rng, n, 0, ni * mi)).collect();
    let b = rhs_above(rng, &a, &v);
    let c = random_vector(rng, n, -ni, ni);

    Ok(GeneratedInstance {
        class: FeasibilityClass::Feasible,
        instance: LpInstance::from_rationals(a, b, c)?,
        witness: Witness::Point(v),
    })
}

/// Unbounded instance with `n` variables and `m` constraints.
///
/// Every row of `A` is oriented so that `Av < 0` for a direction `v > 0`,
/// and `c` is oriented so that `cᵗv > 0`. Moving from the feasible base
/// point `u` along `v` then stays feasible and grows the objective forever.
pub fn generate_unbounded<R: Rng + ?Sized>(rng: &mut R, n: usize, m: usize) -> Result<GeneratedInstance, GenError> {
    check_size(n, "n")?;
    check_size(m, "m")?;
    let (instance, base, direction) = unbounded_parts(rng, n, m)?;
    Ok(GeneratedInstance {
        class: FeasibilityClass::Unbounded,
        instance,
        witness: Witness::Ray { base, direction },
    })
}

/// Unbounded instance together with its base point `u` and ray `v`.
fn unbounded_parts<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
) -> Result<(LpInstance, Vec<BigRational>, Vec<BigRational>), GenError> {
    let ni = n as i64;

    let u = random_vector(rng, n, 0, 2 * ni);
    let v: Vec<BigRational> = random_vector(rng, n, 0, 2 * ni)
        .into_iter()
        .map(|x| if x.is_zero() { integer(1) } else { x })
        .collect();

    let mut a = Vec::with_capacity(m);
    for _ in 0..m {
        // an all-zero row has Av = 0 in either orientation
        let mut row = random_vector(rng, n, 0, 100);
        while row.iter().all(Zero::is_zero) {
            row = random_vector(rng, n, 0, 100);
        }
        if !dot(&row, &v).is_negative() {
            row = row.into_iter().map(|x| -x).collect();
        }
        a.push(row);
    }
    let b = rhs_above(rng, &a, &u);

    let c = loop {
        let c = random_vector(rng, n, -2 * ni, 2 * ni);
        let slope = dot(&c, &v);
        if slope.is_negative() {
            break c.into_iter().map(|x| -x).collect::<Vec<_>>();
        }
        if slope.is_positive() {
            break c;
        }
    };

    Ok((LpInstance::from_rationals(a, b, c)?, u, v))
}

/// Infeasible instance with `n` variables and `m` constraints.
///
/// Builds an unbounded instance `(A, b, c)` with the sizes swapped and
/// returns `(-Aᵗ, -c, -b)`. With the source ray `v`:
/// `vᵗ(-Aᵗ) = -(Av)ᵗ > 0` and `vᵗ(-c) < 0`, so `v` is a Farkas certificate.
pub fn generate_infeasible<R: Rng + ?Sized>(rng: &mut R, n: usize, m: usize) -> Result<GeneratedInstance, GenError> {
    check_size(n, "n")?;
    check_size(m, "m")?;
    let (lp, _, direction) = unbounded_parts(rng, m, n)?;

    let a: Vec<Vec<BigRational>> = (0..lp.num_variables())
        .map(|j| lp.a().iter().map(|row| -&row[j]).collect())
        .collect();
    let b: Vec<BigRational> = lp.c().iter().map(|x| -x).collect();
    let c: Vec<BigRational> = lp.b().iter().map(|x| -x).collect();

    Ok(GeneratedInstance {
        class: FeasibilityClass::Infeasible,
        instance: LpInstance::from_rationals(a, b, c)?,
        witness: Witness::Farkas(direction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SIZES: [(usize, usize); 6] = [(1, 1), (1, 4), (4, 1), (3, 3), (5, 8), (10, 6)];

    #[test]
    fn test_feasible_witness_holds() {
        let mut rng = StdRng::seed_from_u64(7);
        for (n, m) in SIZES {
            for _ in 0..10 {
                let generated = generate_feasible(&mut rng, n, m).unwrap();
                assert_eq!(generated.instance.num_variables(), n);
                assert_eq!(generated.instance.num_constraints(), m);
                assert!(generated.verify(), "witness failed for {}x{}", m, n);
            }
        }
    }

    #[test]
    fn test_feasible_perturbation_is_quarter_step() {
        let mut rng = StdRng::seed_from_u64(11);
        let generated = generate_feasible(&mut rng, 4, 6).unwrap();
        let Witness::Point(v) = &generated.witness else {
            panic!("expected a point witness");
        };
        let quarter = BigRational::new(BigInt::from(1), BigInt::from(4));
        for (row, rhs) in generated.instance.a().iter().zip(generated.instance.b()) {
            let slack = rhs - dot(row, v);
            assert!(!slack.is_negative());
            assert!(slack < integer(1));
            assert!((slack / &quarter).is_integer());
        }
    }

    #[test]
    fn test_unbounded_ray_holds() {
        let mut rng = StdRng::seed_from_u64(3);
        for (n, m) in SIZES {
            for _ in 0..10 {
                let generated = generate_unbounded(&mut rng, n, m).unwrap();
                assert!(generated.verify(), "ray failed for {}x{}", m, n);

                let Witness::Ray { base, direction } = &generated.witness else {
                    panic!("expected a ray witness");
                };
                // strictly decreasing along the ray in every row
                for row in generated.instance.a() {
                    assert!(dot(row, direction).is_negative());
                }
                let far: Vec<BigRational> = base
                    .iter()
                    .zip(direction)
                    .map(|(u, d)| u + d * integer(1000))
                    .collect();
                assert!(generated.instance.is_feasible_point(&far));
                assert!(generated.instance.objective_at(&far) > generated.instance.objective_at(base));
            }
        }
    }

    #[test]
    fn test_infeasible_certificate_holds() {
        let mut rng = StdRng::seed_from_u64(5);
        for (n, m) in SIZES {
            for _ in 0..10 {
                let generated = generate_infeasible(&mut rng, n, m).unwrap();
                assert_eq!(generated.class, FeasibilityClass::Infeasible);
                assert_eq!(generated.instance.num_variables(), n);
                assert_eq!(generated.instance.num_constraints(), m);
                assert!(generated.verify(), "certificate failed for {}x{}", m, n);
            }
        }
    }

    #[test]
    fn test_same_seed_same_instance() {
        let first = generate_unbounded(&mut StdRng::seed_from_u64(42), 4, 3).unwrap();
        let second = generate_unbounded(&mut StdRng::seed_from_u64(42), 4, 3).unwrap();
        assert_eq!(first.instance, second.instance);
        assert_eq!(first.witness, second.witness);
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_feasible(&mut rng, 0, 3).unwrap_err(),
            GenError::InvalidSize { name: "n" }
        );
        assert_eq!(
            generate_infeasible(&mut rng, 2, 0).unwrap_err(),
            GenError::InvalidSize { name: "m" }
        );
    }

    #[test]
    fn test_witness_class_mismatch_fails_verify() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut generated = generate_feasible(&mut rng, 2, 2).unwrap();
        generated.class = FeasibilityClass::Unbounded;
        assert!(!generated.verify());
    }
}
