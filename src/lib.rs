//! Partitioned Bellman-Ford single-source shortest paths.
//!
//! The edge list is split into contiguous, balanced partitions, one per
//! worker. Every round the host broadcasts the global distance vector, each
//! worker relaxes its own partition against a private copy, and the host folds
//! the returned vectors back in by element-wise minimum. The loop stops when a
//! round produces no change or the round budget runs out. A sequential
//! Bellman-Ford serves as the oracle.
//!
//! ```
//! use sssp_partitioned::{solve, CoordinatorConfig, Graph};
//!
//! let g = Graph::from_triples(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap();
//! let out = solve(&g, CoordinatorConfig::new(2)).unwrap();
//! assert!(out.status.is_converged());
//! assert_eq!(out.distances, vec![0, 1, 3, 4]);
//! ```
//!
//! Also exposed through a stable C ABI (see [`ffi`]).

pub mod config;
pub mod coordinator;
pub mod error;
pub mod ffi;
pub mod generate;
pub mod graph;
pub mod io;
pub mod kernel;
pub mod metrics;
pub mod partition;
pub mod reference;
pub mod validate;
pub mod worker;

pub use config::{CoordinatorConfig, WorkerBackend};
pub use coordinator::{merge_min, solve, Coordinator, RoundSummary, RunOutcome, RunStatus};
pub use error::{Result, SsspError};
pub use generate::{random_graph, GeneratorParams};
pub use graph::{Distance, Edge, Graph, VertexId, Weight, UNREACHABLE};
pub use io::{load_graph, parse_graph, read_graph, save_graph, write_graph};
pub use kernel::{relax_partition, KernelOutput, KernelStats, RelaxMode};
pub use metrics::{run_benchmark, BenchmarkReport, PhaseTimings, RunMetrics};
pub use partition::{partition_edges, validate_cover, Partition, WorkerId};
pub use reference::{reference_bellman_ford, ReferenceOptions, ReferenceRun};
pub use validate::{compare, fixpoint_violations, ValidationReport};
pub use worker::{Buffer, LocalWorker, Region, ThreadWorker, Worker, WorkerError};
