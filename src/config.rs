//! Run configuration.
//!
//! Values come from code (builder methods), JSON (`serde`), or the
//! environment via [`CoordinatorConfig::from_env`]:
//!
//! | variable              | meaning                                                  |
//! |-----------------------|----------------------------------------------------------|
//! | `SSSP_WORKERS`        | worker count (default 4)                                 |
//! | `SSSP_MAX_ROUNDS`     | host round budget (default `max(V, 1)`)                  |
//! | `SSSP_LOCAL_PASSES`   | `0`/`1` single pass, `n` multi-pass cap, `max` fixpoint  |
//! | `SSSP_SOURCE`         | source vertex (default 0)                                |
//! | `SSSP_PARALLEL`       | launch workers concurrently (`1`/`true`)                 |
//! | `SSSP_BACKEND`        | `local` or `thread`                                      |
//! | `SSSP_TIME_BUDGET_MS` | wall-clock limit checked at round boundaries             |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};
use crate::graph::{Graph, VertexId};
use crate::kernel::RelaxMode;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerBackend {
    #[default]
    Local,
    Thread,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub worker_count: usize,
    /// `None` means `max(V, 1)`: `V - 1` productive rounds plus the round that
    /// observes no change. `Some(0)` is rejected by [`Self::validate`].
    pub max_rounds: Option<usize>,
    pub relax_mode: RelaxMode,
    pub source: VertexId,
    pub parallel: bool,
    pub backend: WorkerBackend,
    pub time_budget_ms: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            max_rounds: None,
            relax_mode: RelaxMode::SinglePass,
            source: 0,
            parallel: cfg!(feature = "parallel"),
            backend: WorkerBackend::Local,
            time_budget_ms: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn parse_local_passes(v: &str) -> Option<RelaxMode> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("max") {
        return Some(RelaxMode::until_fixpoint());
    }
    match v.parse::<usize>().ok()? {
        0 | 1 => Some(RelaxMode::SinglePass),
        n => Some(RelaxMode::multi_pass(n)),
    }
}

impl CoordinatorConfig {
    pub fn new(worker_count: usize) -> Self { Self { worker_count, ..Self::default() } }

    /// Defaults overridden by any `SSSP_*` variables that are set and parse.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            worker_count: env_parse("SSSP_WORKERS").unwrap_or(d.worker_count),
            max_rounds: env_parse("SSSP_MAX_ROUNDS").or(d.max_rounds),
            relax_mode: std::env::var("SSSP_LOCAL_PASSES").ok().and_then(|v| parse_local_passes(&v)).unwrap_or(d.relax_mode),
            source: env_parse("SSSP_SOURCE").unwrap_or(d.source),
            parallel: env_flag("SSSP_PARALLEL").unwrap_or(d.parallel),
            backend: match std::env::var("SSSP_BACKEND").ok().as_deref() {
                Some("thread") | Some("threads") => WorkerBackend::Thread,
                Some("local") => WorkerBackend::Local,
                _ => d.backend,
            },
            time_budget_ms: env_parse("SSSP_TIME_BUDGET_MS").or(d.time_budget_ms),
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| SsspError::config(format!("bad config json: {e}")))
    }

    pub fn with_workers(mut self, n: usize) -> Self { self.worker_count = n; self }
    pub fn with_max_rounds(mut self, rounds: usize) -> Self { self.max_rounds = Some(rounds); self }
    pub fn with_mode(mut self, mode: RelaxMode) -> Self { self.relax_mode = mode; self }
    pub fn with_source(mut self, source: VertexId) -> Self { self.source = source; self }
    pub fn with_parallel(mut self, parallel: bool) -> Self { self.parallel = parallel; self }
    pub fn with_backend(mut self, backend: WorkerBackend) -> Self { self.backend = backend; self }
    pub fn with_time_budget(mut self, budget: Duration) -> Self { self.time_budget_ms = Some(budget.as_millis() as u64); self }

    pub fn round_budget(&self, vertex_count: usize) -> usize {
        self.max_rounds.unwrap_or(vertex_count.max(1))
    }

    pub fn time_budget(&self) -> Option<Duration> { self.time_budget_ms.map(Duration::from_millis) }

    /// Everything that must hold before the first round runs.
    pub fn validate(&self, graph: &Graph) -> Result<()> {
        if self.worker_count == 0 {
            return Err(SsspError::config("worker count must be at least 1"));
        }
        if self.max_rounds == Some(0) {
            return Err(SsspError::config("round budget must be at least 1"));
        }
        if graph.vertex_count() > 0 && self.source as usize >= graph.vertex_count() {
            return Err(SsspError::config(format!("source {} outside 0..{}", self.source, graph.vertex_count())));
        }
        Ok(())
    }
}
