//! Immutable edge-list graph and the distance vocabulary shared by every solver.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};

pub type VertexId = u32;
pub type Weight = i32;
pub type Distance = i64;

/// Sentinel for "no path found yet". No finite sum along a simple path can
/// reach it: weights are `i32`, vertex ids `u32`, and every addition is
/// overflow-checked by [`relaxed`].
pub const UNREACHABLE: Distance = Distance::MAX;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: Weight,
}

impl Edge {
    #[inline]
    pub const fn new(source: VertexId, target: VertexId, weight: Weight) -> Self {
        Self { source, target, weight }
    }
}

impl From<(VertexId, VertexId, Weight)> for Edge {
    fn from((source, target, weight): (VertexId, VertexId, Weight)) -> Self {
        Self::new(source, target, weight)
    }
}

/// Candidate distance for `target` through an edge of weight `w` leaving a
/// vertex at distance `base`. `None` when `base` is unreachable or the sum
/// would overflow; either way no relaxation may happen.
#[inline(always)]
pub fn relaxed(base: Distance, w: Weight) -> Option<Distance> {
    if base == UNREACHABLE {
        return None;
    }
    match base.checked_add(w as Distance) {
        Some(nd) if nd != UNREACHABLE => Some(nd),
        _ => None,
    }
}

/// Fresh distance vector: `source` at 0, everything else unreachable.
pub fn initial_distances(vertex_count: usize, source: VertexId) -> Vec<Distance> {
    let mut dist = vec![UNREACHABLE; vertex_count];
    if let Some(d) = dist.get_mut(source as usize) {
        *d = 0;
    }
    dist
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    vertex_count: usize,
    edges: Vec<Edge>,
}

impl Graph {
    /// Builds a graph, rejecting edges whose endpoints fall outside `[0, V)`.
    pub fn new(vertex_count: usize, edges: Vec<Edge>) -> Result<Self> {
        if vertex_count > VertexId::MAX as usize {
            return Err(SsspError::InvalidGraph(format!("{vertex_count} vertices exceed the u32 id space")));
        }
        if let Some((i, e)) = edges.iter().enumerate().find(|(_, e)| e.source as usize >= vertex_count || e.target as usize >= vertex_count) {
            return Err(SsspError::InvalidGraph(format!(
                "edge {i} ({} -> {}) references a vertex outside 0..{vertex_count}",
                e.source, e.target
            )));
        }
        Ok(Self { vertex_count, edges })
    }

    pub fn from_triples<I>(vertex_count: usize, triples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (VertexId, VertexId, Weight)>,
    {
        Self::new(vertex_count, triples.into_iter().map(Edge::from).collect())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize { self.vertex_count }

    #[inline]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    #[inline]
    pub fn edges(&self) -> &[Edge] { &self.edges }
}
