//! Host-side round loop.
//!
//! Each round: broadcast the global vector to every worker, launch them all,
//! collect their private vectors and fold them into the global one by
//! element-wise minimum (together with the previous global vector). The host
//! is the only writer of the global vector, and every worker output of round
//! `r` is merged before round `r + 1` is broadcast.

use std::ops::ControlFlow;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CoordinatorConfig, WorkerBackend};
use crate::error::{Result, SsspError};
use crate::graph::{initial_distances, Distance, Graph};
use crate::kernel::KernelStats;
use crate::metrics::{ms, Lap, RunMetrics};
use crate::partition::{partition_edges, validate_cover, Partition};
use crate::worker::{Buffer, LocalWorker, Region, ThreadWorker, Worker, WorkerError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// A round finished with no worker reporting a change.
    Converged { rounds: usize },
    /// The round budget ran out while workers were still improving distances.
    NonConvergence { rounds: usize },
    /// Stopped at a round boundary by the time budget or the round observer.
    Aborted { rounds: usize },
}

impl RunStatus {
    pub fn rounds(&self) -> usize {
        match *self {
            RunStatus::Converged { rounds } | RunStatus::NonConvergence { rounds } | RunStatus::Aborted { rounds } => rounds,
        }
    }

    pub fn is_converged(&self) -> bool { matches!(self, RunStatus::Converged { .. }) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Best distances known when the run stopped. Always monotone with
    /// respect to earlier rounds, even for aborted or unconverged runs.
    pub distances: Vec<Distance>,
    pub status: RunStatus,
    pub metrics: RunMetrics,
}

impl RunOutcome {
    /// The distances, or `NonConvergence` when no fixpoint was observed.
    pub fn into_converged(self) -> Result<Vec<Distance>> {
        match self.status {
            RunStatus::Converged { .. } => Ok(self.distances),
            other => Err(SsspError::NonConvergence { rounds: other.rounds() }),
        }
    }
}

/// What an observer sees after each merge.
#[derive(Debug)]
pub struct RoundSummary<'a> {
    pub round: usize,
    pub changed: bool,
    pub distances: &'a [Distance],
    pub worker_stats: &'a [KernelStats],
}

pub struct Coordinator<'g, W: Worker = Box<dyn Worker>> {
    graph: &'g Graph,
    config: CoordinatorConfig,
    partitions: Vec<Partition>,
    workers: Vec<W>,
}

impl<'g> Coordinator<'g> {
    /// Balanced partitions and one worker per partition on the configured backend.
    pub fn new(graph: &'g Graph, config: CoordinatorConfig) -> Result<Self> {
        config.validate(graph)?;
        let partitions = partition_edges(graph.edge_count(), config.worker_count)?;
        let workers = (0..config.worker_count)
            .map(|id| -> Result<Box<dyn Worker>, WorkerError> {
                let worker: Box<dyn Worker> = match config.backend {
                    WorkerBackend::Local => Box::new(LocalWorker::new(id, config.relax_mode)),
                    WorkerBackend::Thread => Box::new(ThreadWorker::spawn(id, config.relax_mode)?),
                };
                Ok(worker)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_workers(graph, config, partitions, workers)
    }
}

impl<'g, W: Worker> Coordinator<'g, W> {
    /// Caller-supplied partitions and workers; `workers[i]` must have id `i`
    /// and owns `partitions[i]`.
    pub fn with_workers(graph: &'g Graph, config: CoordinatorConfig, partitions: Vec<Partition>, workers: Vec<W>) -> Result<Self> {
        config.validate(graph)?;
        validate_cover(&partitions, graph.edge_count())?;
        if workers.len() != partitions.len() {
            return Err(SsspError::config(format!("{} workers for {} partitions", workers.len(), partitions.len())));
        }
        if let Some((i, w)) = workers.iter().enumerate().find(|(i, w)| w.id() != *i) {
            return Err(SsspError::config(format!("worker at slot {i} reports id {}", w.id())));
        }
        Ok(Self { graph, config, partitions, workers })
    }

    pub fn partitions(&self) -> &[Partition] { &self.partitions }
    pub fn config(&self) -> &CoordinatorConfig { &self.config }

    pub fn run(&mut self) -> Result<RunOutcome> {
        self.run_with(|_| ControlFlow::Continue(()))
    }

    /// Runs the round loop, handing every merged round to `observe`.
    /// Returning `ControlFlow::Break` stops the run at that round boundary.
    pub fn run_with<F>(&mut self, mut observe: F) -> Result<RunOutcome>
    where
        F: FnMut(&RoundSummary<'_>) -> ControlFlow<()>,
    {
        let v = self.graph.vertex_count();
        let budget = self.config.round_budget(v);
        let deadline = self.config.time_budget();
        let started = Instant::now();
        let mut metrics = RunMetrics {
            partition_sizes: self.partitions.iter().map(Partition::len).collect(),
            ..RunMetrics::default()
        };
        let mut lap = Lap::start();

        let vector_bytes = (v * std::mem::size_of::<Distance>()) as u64;
        for (w, p) in self.workers.iter_mut().zip(&self.partitions) {
            let buf = Buffer::Edges(p.edges(self.graph.edges()).to_vec());
            let edge_bytes = buf.byte_len() as u64;
            metrics.bytes_in += edge_bytes;
            metrics.worker_bytes.push(edge_bytes + vector_bytes);
            w.copy_in(Region::Edges, buf)?;
        }
        metrics.phases.load_ms = lap.lap();

        let mut global = initial_distances(v, self.config.source);
        let mut status = RunStatus::NonConvergence { rounds: budget };

        for round in 1..=budget {
            for w in self.workers.iter_mut() {
                let buf = Buffer::Distances(global.clone());
                metrics.bytes_in += buf.byte_len() as u64;
                w.copy_in(Region::Distances, buf)?;
            }
            metrics.phases.copy_in_ms += lap.lap();

            let stats = launch_all(&mut self.workers, self.config.parallel)?;
            metrics.phases.launch_ms += lap.lap();

            let mut outputs = Vec::with_capacity(self.workers.len());
            for w in self.workers.iter_mut() {
                let buf = w.copy_out(Region::Distances)?;
                metrics.bytes_out += buf.byte_len() as u64;
                let dist = buf.into_distances(w.id())?;
                if dist.len() != v {
                    return Err(WorkerError::LengthMismatch { worker: w.id(), expected: v, found: dist.len() }.into());
                }
                outputs.push(dist);
            }
            metrics.phases.copy_out_ms += lap.lap();

            let changed = stats.iter().any(|s| s.changed);
            for out in &outputs {
                merge_min(&mut global, out);
            }
            metrics.phases.merge_ms += lap.lap();
            metrics.rounds = round;
            metrics.relaxations += stats.iter().map(|s| s.relaxations).sum::<u64>();
            metrics.local_passes += stats.iter().map(|s| s.passes as u64).sum::<u64>();

            debug!(round, changed, active = stats.iter().filter(|s| s.changed).count(), "round merged");

            let flow = observe(&RoundSummary { round, changed, distances: &global, worker_stats: &stats });
            if !changed {
                status = RunStatus::Converged { rounds: round };
                break;
            }
            if flow.is_break() {
                status = RunStatus::Aborted { rounds: round };
                break;
            }
            if deadline.is_some_and(|limit| started.elapsed() >= limit) {
                status = RunStatus::Aborted { rounds: round };
                break;
            }
        }

        metrics.total_ms = ms(started.elapsed());
        match status {
            RunStatus::Converged { rounds } => info!(rounds, workers = self.workers.len(), "converged"),
            RunStatus::NonConvergence { rounds } => warn!(rounds, "round budget exhausted before fixpoint"),
            RunStatus::Aborted { rounds } => warn!(rounds, "run aborted at round boundary"),
        }
        Ok(RunOutcome { distances: global, status, metrics })
    }
}

/// `global[i] = min(global[i], out[i])`.
#[inline]
pub fn merge_min(global: &mut [Distance], out: &[Distance]) {
    for (g, &d) in global.iter_mut().zip(out) {
        if d < *g {
            *g = d;
        }
    }
}

#[cfg(feature = "parallel")]
fn launch_all<W: Worker>(workers: &mut [W], parallel: bool) -> Result<Vec<KernelStats>, WorkerError> {
    use rayon::prelude::*;
    if parallel {
        workers.par_iter_mut().map(|w| w.launch()).collect()
    } else {
        workers.iter_mut().map(|w| w.launch()).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn launch_all<W: Worker>(workers: &mut [W], _parallel: bool) -> Result<Vec<KernelStats>, WorkerError> {
    workers.iter_mut().map(|w| w.launch()).collect()
}

/// One-shot convenience over [`Coordinator::new`] + [`Coordinator::run`].
pub fn solve(graph: &Graph, config: CoordinatorConfig) -> Result<RunOutcome> {
    Coordinator::new(graph, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UNREACHABLE;
    use crate::kernel::RelaxMode;

    fn diamond() -> Graph {
        Graph::from_triples(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap()
    }

    #[test]
    fn diamond_converges_for_several_worker_counts() {
        for n in [1, 2, 3, 4, 7] {
            let out = solve(&diamond(), CoordinatorConfig::new(n)).unwrap();
            assert!(out.status.is_converged(), "workers={n}");
            assert_eq!(out.distances, vec![0, 1, 3, 4]);
        }
    }

    #[test]
    fn merge_keeps_previous_minimum() {
        let mut g = vec![0, 5, UNREACHABLE];
        merge_min(&mut g, &[0, 7, 9]);
        assert_eq!(g, vec![0, 5, 9]);
    }

    #[test]
    fn tiny_budget_reports_non_convergence() {
        // reversed chain: one hop per round in single-pass mode
        let g = Graph::from_triples(4, [(2, 3, 1), (1, 2, 1), (0, 1, 1)]).unwrap();
        let out = solve(&g, CoordinatorConfig::new(1).with_max_rounds(2)).unwrap();
        assert_eq!(out.status, RunStatus::NonConvergence { rounds: 2 });
        assert_eq!(out.distances, vec![0, 1, 2, UNREACHABLE]);
        assert!(matches!(out.into_converged(), Err(SsspError::NonConvergence { rounds: 2 })));
    }

    #[test]
    fn multi_pass_needs_fewer_host_rounds() {
        let g = Graph::from_triples(5, [(3, 4, 1), (2, 3, 1), (1, 2, 1), (0, 1, 1)]).unwrap();
        let single = solve(&g, CoordinatorConfig::new(1)).unwrap();
        let multi = solve(&g, CoordinatorConfig::new(1).with_mode(RelaxMode::until_fixpoint())).unwrap();
        assert_eq!(single.distances, multi.distances);
        assert_eq!(single.status, RunStatus::Converged { rounds: 5 });
        assert_eq!(multi.status, RunStatus::Converged { rounds: 2 });
    }

    #[test]
    fn observer_can_abort_at_round_boundary() {
        let g = Graph::from_triples(4, [(2, 3, 1), (1, 2, 1), (0, 1, 1)]).unwrap();
        let mut seen = Vec::new();
        let out = Coordinator::new(&g, CoordinatorConfig::new(2))
            .unwrap()
            .run_with(|r| {
                seen.push(r.round);
                if r.round == 1 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
            })
            .unwrap();
        assert_eq!(seen, vec![1]);
        assert_eq!(out.status, RunStatus::Aborted { rounds: 1 });
    }

    #[test]
    fn thread_backend_matches_local() {
        let local = solve(&diamond(), CoordinatorConfig::new(3)).unwrap();
        let threaded = solve(&diamond(), CoordinatorConfig::new(3).with_backend(WorkerBackend::Thread)).unwrap();
        assert_eq!(local.distances, threaded.distances);
        assert_eq!(local.status, threaded.status);
    }

    #[test]
    fn mismatched_worker_ids_rejected() {
        let g = diamond();
        let parts = partition_edges(g.edge_count(), 2).unwrap();
        let workers = vec![LocalWorker::new(1, RelaxMode::SinglePass), LocalWorker::new(0, RelaxMode::SinglePass)];
        assert!(matches!(
            Coordinator::with_workers(&g, CoordinatorConfig::new(2), parts, workers),
            Err(SsspError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn metrics_count_transfers() {
        let g = diamond();
        let out = solve(&g, CoordinatorConfig::new(2)).unwrap();
        let rounds = out.metrics.rounds as u64;
        let vec_bytes = (g.vertex_count() * std::mem::size_of::<Distance>()) as u64;
        let edge_bytes = (g.edge_count() * std::mem::size_of::<crate::graph::Edge>()) as u64;
        assert_eq!(out.metrics.bytes_in, edge_bytes + 2 * rounds * vec_bytes);
        assert_eq!(out.metrics.bytes_out, 2 * rounds * vec_bytes);
        let edge = std::mem::size_of::<crate::graph::Edge>() as u64;
        assert_eq!(out.metrics.worker_bytes, vec![2 * edge + vec_bytes, 2 * edge + vec_bytes]);
    }

    #[test]
    fn idle_worker_footprint_is_one_vector() {
        let g = diamond();
        let out = solve(&g, CoordinatorConfig::new(6)).unwrap();
        let edge = std::mem::size_of::<crate::graph::Edge>() as u64;
        let vec_bytes = (g.vertex_count() * std::mem::size_of::<Distance>()) as u64;
        assert_eq!(out.metrics.worker_bytes.len(), 6);
        assert_eq!(out.metrics.worker_bytes[0], edge + vec_bytes);
        assert_eq!(out.metrics.worker_bytes[5], vec_bytes);
    }
}
