//! Comparison against the oracle and fixpoint checks.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};
use crate::graph::{relaxed, Distance, Graph};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `equal[v]` is true when both vectors agree on vertex `v`.
    pub equal: Vec<bool>,
    pub matches: usize,
    pub mismatched: Vec<usize>,
}

impl ValidationReport {
    #[inline]
    pub fn mismatch_count(&self) -> usize { self.mismatched.len() }
    #[inline]
    pub fn is_match(&self) -> bool { self.mismatched.is_empty() }

    /// `ResultMismatch` when any vertex disagrees.
    pub fn ensure_match(&self) -> Result<()> {
        match self.mismatched.first() {
            None => Ok(()),
            Some(&first) => Err(SsspError::ResultMismatch {
                mismatches: self.mismatched.len(),
                vertices: self.equal.len(),
                first,
            }),
        }
    }
}

pub fn compare(expected: &[Distance], actual: &[Distance]) -> Result<ValidationReport> {
    if expected.len() != actual.len() {
        return Err(SsspError::config(format!(
            "cannot compare distance vectors of length {} and {}",
            expected.len(),
            actual.len()
        )));
    }
    let equal: Vec<bool> = expected.iter().zip(actual).map(|(a, b)| a == b).collect();
    let mismatched: Vec<usize> = equal.iter().enumerate().filter(|(_, eq)| !**eq).map(|(i, _)| i).collect();
    Ok(ValidationReport { matches: equal.len() - mismatched.len(), equal, mismatched })
}

/// Indices of edges that could still relax `dist`. Empty at a Bellman-Ford
/// fixpoint.
pub fn fixpoint_violations(graph: &Graph, dist: &[Distance]) -> Result<Vec<usize>> {
    if dist.len() != graph.vertex_count() {
        return Err(SsspError::config(format!(
            "distance vector has {} entries for a graph of {} vertices",
            dist.len(),
            graph.vertex_count()
        )));
    }
    Ok(graph
        .edges()
        .iter()
        .enumerate()
        .filter(|(_, e)| relaxed(dist[e.source as usize], e.weight).is_some_and(|nd| nd < dist[e.target as usize]))
        .map(|(i, _)| i)
        .collect())
}
