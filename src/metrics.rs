//! Observational metrics and the JSON benchmark report.
//!
//! Nothing here affects correctness; the numbers are what the host driver
//! prints or writes after a run.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::CoordinatorConfig;
use crate::coordinator::{Coordinator, RunStatus};
use crate::error::Result;
use crate::graph::Graph;
use crate::kernel::RelaxMode;
use crate::reference::{reference_bellman_ford, ReferenceOptions};
use crate::validate::{compare, ValidationReport};

#[inline]
pub(crate) fn ms(d: Duration) -> f64 { d.as_secs_f64() * 1000.0 }

/// Host-side time spent in each phase of the round protocol, summed over
/// all rounds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Partition upload, once per run.
    pub load_ms: f64,
    /// Distance broadcast.
    pub copy_in_ms: f64,
    pub launch_ms: f64,
    pub copy_out_ms: f64,
    pub merge_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub rounds: usize,
    pub total_ms: f64,
    pub phases: PhaseTimings,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub partition_sizes: Vec<usize>,
    /// Private memory each worker holds: its edge slice plus one full
    /// distance vector.
    pub worker_bytes: Vec<u64>,
    pub relaxations: u64,
    pub local_passes: u64,
}

/// Phase stopwatch: `lap` returns the time since the previous lap.
pub(crate) struct Lap(Instant);

impl Lap {
    pub(crate) fn start() -> Self { Lap(Instant::now()) }
    pub(crate) fn lap(&mut self) -> f64 {
        let now = Instant::now();
        let d = now - self.0;
        self.0 = now;
        ms(d)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub vertices: usize,
    pub edges: usize,
    pub workers: usize,
    pub relax_mode: RelaxMode,
    pub reference_ms: f64,
    pub reference_passes: usize,
    pub status: RunStatus,
    pub distributed: RunMetrics,
    pub matches: usize,
    pub mismatches: usize,
    pub mismatched_vertices: Vec<usize>,
    pub speedup: f64,
}

impl BenchmarkReport {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Reference run, partitioned run, validation: the whole host program.
/// Mismatches are recorded in the report rather than returned as an error so
/// the caller can still print metrics; use
/// [`ValidationReport::ensure_match`] when a mismatch must fail.
pub fn run_benchmark(graph: &Graph, config: &CoordinatorConfig) -> Result<(BenchmarkReport, ValidationReport)> {
    let reference = reference_bellman_ford(graph, config.source, ReferenceOptions::default())?;
    let outcome = Coordinator::new(graph, config.clone())?.run()?;
    let validation = compare(&reference.distances, &outcome.distances)?;
    let speedup = reference.elapsed_ms / outcome.metrics.total_ms.max(1e-9);
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        reference_ms = reference.elapsed_ms,
        distributed_ms = outcome.metrics.total_ms,
        mismatches = validation.mismatch_count(),
        "benchmark finished"
    );
    let report = BenchmarkReport {
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
        workers: config.worker_count,
        relax_mode: config.relax_mode,
        reference_ms: reference.elapsed_ms,
        reference_passes: reference.passes,
        status: outcome.status,
        distributed: outcome.metrics,
        matches: validation.matches,
        mismatches: validation.mismatch_count(),
        mismatched_vertices: validation.mismatched.clone(),
        speedup,
    };
    Ok((report, validation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialises_status_and_counts() {
        let g = Graph::from_triples(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap();
        let (report, validation) = run_benchmark(&g, &CoordinatorConfig::new(2)).unwrap();
        validation.ensure_match().unwrap();
        let json = report.to_json();
        assert_eq!(json["vertices"], 4);
        assert_eq!(json["mismatches"], 0);
        assert_eq!(json["status"]["status"], "converged");
        assert_eq!(json["distributed"]["partition_sizes"], serde_json::json!([2, 2]));
    }
}
