//! Per-partition relaxation kernel.
//!
//! A worker runs this once per round against its private copy of the global
//! distance vector. It never sees another worker's state, so invocations for
//! different partitions can run concurrently.

use serde::{Deserialize, Serialize};

use crate::graph::{relaxed, Distance, Edge};

/// How many scans a worker makes over its partition per round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxMode {
    /// One scan, then report back to the host.
    #[default]
    SinglePass,
    /// Rescan until the partition reaches a local fixpoint or `max_passes`
    /// scans have run. `None` caps at the vertex count, which a partition
    /// without a negative cycle never needs to exceed.
    MultiPass { max_passes: Option<usize> },
}

impl RelaxMode {
    pub fn multi_pass(max_passes: usize) -> Self { RelaxMode::MultiPass { max_passes: Some(max_passes) } }
    pub fn until_fixpoint() -> Self { RelaxMode::MultiPass { max_passes: None } }

    #[inline]
    fn pass_cap(self, vertex_count: usize) -> usize {
        match self {
            RelaxMode::SinglePass => 1,
            RelaxMode::MultiPass { max_passes: Some(n) } => n.max(1),
            RelaxMode::MultiPass { max_passes: None } => vertex_count.max(1),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelStats {
    pub changed: bool,
    pub passes: u32,
    pub relaxations: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelOutput {
    pub distances: Vec<Distance>,
    pub stats: KernelStats,
}

impl KernelOutput {
    #[inline]
    pub fn changed(&self) -> bool { self.stats.changed }
}

/// One scan over `edges` in order. Returns the number of relaxations applied.
#[inline]
pub fn relax_pass(edges: &[Edge], dist: &mut [Distance]) -> u64 {
    let mut relaxations = 0u64;
    for e in edges {
        let Some(nd) = relaxed(dist[e.source as usize], e.weight) else { continue };
        let cur = &mut dist[e.target as usize];
        if nd < *cur {
            *cur = nd;
            relaxations += 1;
        }
    }
    relaxations
}

/// Relaxes `dist` in place according to `mode`.
pub fn relax_in_place(edges: &[Edge], dist: &mut [Distance], mode: RelaxMode) -> KernelStats {
    let cap = mode.pass_cap(dist.len());
    let mut stats = KernelStats::default();
    if edges.is_empty() {
        return stats;
    }
    while (stats.passes as usize) < cap {
        stats.passes += 1;
        let applied = relax_pass(edges, dist);
        if applied == 0 {
            break;
        }
        stats.relaxations += applied;
        stats.changed = true;
    }
    stats
}

/// Pure form of the kernel: `input` is left untouched.
pub fn relax_partition(edges: &[Edge], input: &[Distance], mode: RelaxMode) -> KernelOutput {
    let mut distances = input.to_vec();
    let stats = relax_in_place(edges, &mut distances, mode);
    KernelOutput { distances, stats }
}
