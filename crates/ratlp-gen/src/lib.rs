mod generated;
mod graph;
mod klee_minty;
mod random;
mod vertex_cover;

pub use generated::{FeasibilityClass, GenError, GeneratedInstance, Witness};
pub use graph::{Graph, gnm_random_graph};
pub use klee_minty::generate_klee_minty;
pub use random::{generate_feasible, generate_infeasible, generate_unbounded};
pub use vertex_cover::generate_vertex_cover;
