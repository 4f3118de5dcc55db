use rand::Rng;
use ratlp_model::{BigRational, LpInstance};

use crate::generated::{FeasibilityClass, GenError, GeneratedInstance, Witness, integer};
use crate::graph::{Graph, gnm_random_graph};

/// LP relaxation of minimum vertex cover on a random graph with `n` vertices
/// and `m` edges.
pub fn generate_vertex_cover<R: Rng + ?Sized>(rng: &mut R, n: usize, m: usize) -> Result<GeneratedInstance, GenError> {
    vertex_cover_relaxation(&gnm_random_graph(rng, n, m))
}

/// `min 1ᵗx s.t. x_u + x_v >= 1` per edge, written as
/// `max -1ᵗx s.t. -x_u - x_v <= -1`.
pub(crate) fn vertex_cover_relaxation(graph: &Graph) -> Result<GeneratedInstance, GenError> {
    let n = graph.vertices;
    let a: Vec<Vec<BigRational>> = graph
        .edges
        .iter()
        .map(|&(u, v)| {
            let mut row = vec![integer(0); n];
            row[u] = integer(-1);
            row[v] = integer(-1);
            row
        })
        .collect();
    let b: Vec<BigRational> = vec![integer(-1); graph.edges.len()];
    let c = vec![integer(-1); n];

    Ok(GeneratedInstance {
        class: FeasibilityClass::Feasible,
        instance: LpInstance::from_rationals(a, b, c)?,
        witness: Witness::Point(vec![integer(1); n]),
    })
}
