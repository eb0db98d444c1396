//! Seeded random directed graphs for benchmarks and tests.

use std::collections::HashSet;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};
use crate::graph::{Edge, Graph, VertexId, Weight};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub vertices: usize,
    pub edges: usize,
    /// Weights are drawn uniformly from `1..=max_weight`.
    pub max_weight: Weight,
    pub seed: u64,
}

impl Default for GeneratorParams {
    fn default() -> Self { Self { vertices: 1000, edges: 4000, max_weight: 100, seed: 42 } }
}

/// No self-loops and no repeated `(u, v)` pair; the same seed always yields
/// the same edge list in the same order.
pub fn random_graph(p: GeneratorParams) -> Result<Graph> {
    let max_edges = p.vertices.saturating_mul(p.vertices.saturating_sub(1));
    if p.edges > max_edges {
        return Err(SsspError::config(format!(
            "{} edges requested but {} vertices allow at most {max_edges}",
            p.edges, p.vertices
        )));
    }
    if p.vertices > VertexId::MAX as usize {
        return Err(SsspError::config(format!("{} vertices exceed the u32 id space", p.vertices)));
    }
    if p.max_weight < 1 {
        return Err(SsspError::config("max_weight must be at least 1"));
    }
    let mut rng = SmallRng::seed_from_u64(p.seed);
    let mut seen: HashSet<(VertexId, VertexId)> = HashSet::with_capacity(p.edges);
    let mut edges = Vec::with_capacity(p.edges);
    let n = p.vertices as VertexId;
    while edges.len() < p.edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v || !seen.insert((u, v)) {
            continue;
        }
        edges.push(Edge::new(u, v, rng.gen_range(1..=p.max_weight)));
    }
    Graph::new(p.vertices, edges)
}
