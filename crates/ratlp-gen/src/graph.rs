use rand::Rng;
use rand::seq::index;

/// Simple undirected graph on vertices `0..vertices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    pub vertices: usize,
    /// Edges as `(u, v)` with `u < v`, sorted
    pub edges: Vec<(usize, usize)>,
}

/// Uniform random graph with `vertices` vertices and `edges` distinct edges.
///
/// Asking for more edges than the graph can hold yields the complete graph.
pub fn gnm_random_graph<R: Rng + ?Sized>(rng: &mut R, vertices: usize, edges: usize) -> Graph {
    let max_edges = vertices * vertices.saturating_sub(1) / 2;
    let mut chosen: Vec<(usize, usize)> = if edges >= max_edges {
        (0..max_edges).map(|k| edge_at(vertices, k)).collect()
    } else {
        index::sample(rng, max_edges, edges)
            .into_iter()
            .map(|k| edge_at(vertices, k))
            .collect()
    };
    chosen.sort_unstable();
    Graph {
        vertices,
        edges: chosen,
    }
}

/// Maps `k` to the k-th pair of the row-major upper triangle.
fn edge_at(vertices: usize, mut k: usize) -> (usize, usize) {
    for u in 0..vertices {
        let row = vertices - 1 - u;
        if k < row {
            return (u, u + 1 + k);
        }
        k -= row;
    }
    unreachable!("edge index out of range")
}
