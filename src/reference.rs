//! Sequential Bellman-Ford used as the correctness oracle.

use std::time::Instant;

use tracing::debug;

use crate::error::{Result, SsspError};
use crate::graph::{initial_distances, Distance, Graph, VertexId};
use crate::kernel::relax_pass;
use crate::metrics::ms;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReferenceOptions {
    /// Stop as soon as a full pass relaxes nothing instead of always running
    /// `V - 1` passes.
    pub early_exit: bool,
}

impl Default for ReferenceOptions {
    fn default() -> Self { Self { early_exit: true } }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceRun {
    pub distances: Vec<Distance>,
    pub elapsed_ms: f64,
    pub passes: usize,
    pub relaxations: u64,
}

pub fn reference_bellman_ford(graph: &Graph, source: VertexId, opts: ReferenceOptions) -> Result<ReferenceRun> {
    let n = graph.vertex_count();
    if n > 0 && source as usize >= n {
        return Err(SsspError::config(format!("source {source} outside 0..{n}")));
    }
    let mut dist = initial_distances(n, source);
    let start = Instant::now();
    let mut passes = 0usize;
    let mut relaxations = 0u64;
    for _ in 1..n {
        passes += 1;
        let applied = relax_pass(graph.edges(), &mut dist);
        relaxations += applied;
        if applied == 0 && opts.early_exit {
            break;
        }
    }
    let elapsed_ms = ms(start.elapsed());
    debug!(passes, relaxations, elapsed_ms, "reference solver finished");
    Ok(ReferenceRun { distances: dist, elapsed_ms, passes, relaxations })
}
