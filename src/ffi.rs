//! Stable C ABI.
//!
//! Graphs cross the boundary as three parallel arrays (`sources`, `targets`,
//! `weights`) of length `m`. Every entry point returns 0 on success or a
//! negative code: the values of [`crate::SsspError::code`], plus [`ERR_NULL_POINTER`].

use core::slice;

use crate::config::CoordinatorConfig;
use crate::coordinator::{solve, RunStatus};
use crate::error::Result;
use crate::graph::{Distance, Edge, Graph};
use crate::kernel::RelaxMode;
use crate::reference::{reference_bellman_ford, ReferenceOptions};

pub const ERR_NULL_POINTER: i32 = -8;

/// `local_passes` value selecting multi-pass until the local fixpoint.
pub const LOCAL_PASSES_FIXPOINT: u32 = u32::MAX;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PartitionedRunInfo {
    pub rounds: u32,
    pub status: i32,          // 0 converged, 1 budget exhausted, 2 aborted
    pub relaxations: u64,
    pub local_passes: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub total_ms: f64,
    pub error_code: i32,      // 0 == success
}

#[inline(always)]
unsafe fn as_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 { &[] } else { slice::from_raw_parts(ptr, len) }
}

#[inline(always)]
unsafe fn as_mut_slice<'a, T>(ptr: *mut T, len: usize) -> &'a mut [T] {
    if len == 0 { &mut [] } else { slice::from_raw_parts_mut(ptr, len) }
}

unsafe fn graph_from_raw(n: u32, m: u32, sources: *const u32, targets: *const u32, weights: *const i32) -> Result<Graph> {
    let m = m as usize;
    let (src, tgt, wts) = (as_slice(sources, m), as_slice(targets, m), as_slice(weights, m));
    let edges = src.iter().zip(tgt).zip(wts).map(|((&u, &v), &w)| Edge::new(u, v, w)).collect();
    Graph::new(n as usize, edges)
}

fn mode_from_raw(local_passes: u32) -> RelaxMode {
    match local_passes {
        0 | 1 => RelaxMode::SinglePass,
        LOCAL_PASSES_FIXPOINT => RelaxMode::until_fixpoint(),
        k => RelaxMode::multi_pass(k as usize),
    }
}

fn run_partitioned(graph: &Graph, source: u32, workers: u32, max_rounds: u32, local_passes: u32) -> Result<(Vec<Distance>, PartitionedRunInfo)> {
    let mut config = CoordinatorConfig::new(workers as usize).with_source(source).with_mode(mode_from_raw(local_passes));
    if max_rounds > 0 {
        config = config.with_max_rounds(max_rounds as usize);
    }
    let out = solve(graph, config)?;
    let status = match out.status {
        RunStatus::Converged { .. } => 0,
        RunStatus::NonConvergence { .. } => 1,
        RunStatus::Aborted { .. } => 2,
    };
    let info = PartitionedRunInfo {
        rounds: out.status.rounds() as u32,
        status,
        relaxations: out.metrics.relaxations,
        local_passes: out.metrics.local_passes,
        bytes_in: out.metrics.bytes_in,
        bytes_out: out.metrics.bytes_out,
        total_ms: out.metrics.total_ms,
        error_code: 0,
    };
    Ok((out.distances, info))
}

#[no_mangle]
pub extern "C" fn sssp_partitioned_version() -> u32 { 1 }

/// Partitioned Bellman-Ford. `max_rounds == 0` selects the default budget;
/// `local_passes` is 0/1 for single-pass, `k` for a pass cap, or
/// [`LOCAL_PASSES_FIXPOINT`].
///
/// An empty graph (`n == 0`) converges in one round and writes nothing.
///
/// # Safety
/// `sources`, `targets`, `weights` must point to `m` readable elements,
/// `out_dist` to `n` writable `i64`s (may be null when `n == 0`). `info` may
/// be null.
#[no_mangle]
pub unsafe extern "C" fn sssp_run_partitioned(
    n: u32,
    m: u32,
    sources: *const u32,
    targets: *const u32,
    weights: *const i32,
    source: u32,
    workers: u32,
    max_rounds: u32,
    local_passes: u32,
    out_dist: *mut i64,
    info: *mut PartitionedRunInfo,
) -> i32 {
    if (n > 0 && out_dist.is_null()) || (m > 0 && (sources.is_null() || targets.is_null() || weights.is_null())) { return ERR_NULL_POINTER; }

    let res = graph_from_raw(n, m, sources, targets, weights)
        .and_then(|g| run_partitioned(&g, source, workers, max_rounds, local_passes));

    match res {
        Ok((dist, meta)) => {
            as_mut_slice(out_dist, n as usize).copy_from_slice(&dist);
            if !info.is_null() { *info = meta; }
            0
        }
        Err(e) => {
            let code = e.code();
            if !info.is_null() { *info = PartitionedRunInfo { error_code: code, ..PartitionedRunInfo::default() }; }
            code
        }
    }
}

/// Sequential oracle over the same raw graph layout.
///
/// # Safety
/// As for [`sssp_run_partitioned`]; `elapsed_ms` may be null.
#[no_mangle]
pub unsafe extern "C" fn sssp_run_reference(
    n: u32,
    m: u32,
    sources: *const u32,
    targets: *const u32,
    weights: *const i32,
    source: u32,
    out_dist: *mut i64,
    elapsed_ms: *mut f64,
) -> i32 {
    if (n > 0 && out_dist.is_null()) || (m > 0 && (sources.is_null() || targets.is_null() || weights.is_null())) { return ERR_NULL_POINTER; }
    let res = graph_from_raw(n, m, sources, targets, weights)
        .and_then(|g| reference_bellman_ford(&g, source, ReferenceOptions::default()));
    match res {
        Ok(run) => {
            as_mut_slice(out_dist, n as usize).copy_from_slice(&run.distances);
            if !elapsed_ms.is_null() { *elapsed_ms = run.elapsed_ms; }
            0
        }
        Err(e) => e.code(),
    }
}
