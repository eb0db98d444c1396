//! Contiguous, balanced edge partitioning.
//!
//! Worker `i` owns `ceil(E/N)` edges when `i < E mod N` and `floor(E/N)`
//! otherwise; partitions are laid out back to back in owner order, so the
//! assignment depends on `(E, N)` alone.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};
use crate::graph::Edge;

pub type WorkerId = usize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub owner: WorkerId,
    pub start: usize,
    pub end: usize,
}

impl Partition {
    #[inline]
    pub fn range(&self) -> Range<usize> { self.start..self.end }
    #[inline]
    pub fn len(&self) -> usize { self.end - self.start }
    #[inline]
    pub fn is_empty(&self) -> bool { self.start == self.end }

    /// The slice of `edges` owned by this partition.
    #[inline]
    pub fn edges<'a>(&self, edges: &'a [Edge]) -> &'a [Edge] { &edges[self.range()] }
}

pub fn partition_edges(edge_count: usize, worker_count: usize) -> Result<Vec<Partition>> {
    if worker_count == 0 {
        return Err(SsspError::config("worker count must be at least 1"));
    }
    let base = edge_count / worker_count;
    let extra = edge_count % worker_count;
    let mut start = 0usize;
    let parts = (0..worker_count)
        .map(|owner| {
            let len = base + usize::from(owner < extra);
            let p = Partition { owner, start, end: start + len };
            start += len;
            p
        })
        .collect();
    Ok(parts)
}

/// Checks a caller-supplied partition set: non-empty, owners `0..N` in order,
/// contiguous, and covering exactly `edge_count` edges.
pub fn validate_cover(partitions: &[Partition], edge_count: usize) -> Result<()> {
    if partitions.is_empty() {
        return Err(SsspError::config("worker count must be at least 1"));
    }
    let mut next = 0usize;
    for (i, p) in partitions.iter().enumerate() {
        if p.owner != i {
            return Err(SsspError::config(format!("partition {i} is owned by worker {}", p.owner)));
        }
        if p.start != next || p.end < p.start {
            return Err(SsspError::config(format!("partition {i} spans {}..{}, expected to start at {next}", p.start, p.end)));
        }
        next = p.end;
    }
    if next != edge_count {
        return Err(SsspError::config(format!("partitions cover {next} edges but the graph has {edge_count}")));
    }
    Ok(())
}
