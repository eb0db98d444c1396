//! The worker boundary: private memory reached only through
//! `copy_in` / `launch` / `copy_out`.
//!
//! Two backends are provided. [`LocalWorker`] keeps its buffers in the host
//! process and runs the kernel on the calling thread. [`ThreadWorker`] moves a
//! `LocalWorker` onto a dedicated OS thread and talks to it over channels, so
//! every transfer is an actual move between threads.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::graph::{Distance, Edge, VertexId};
use crate::kernel::{relax_in_place, KernelStats, RelaxMode};
use crate::partition::WorkerId;

/// Named memory regions a worker exposes to the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Edges,
    Distances,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Buffer {
    Edges(Vec<Edge>),
    Distances(Vec<Distance>),
}

impl Buffer {
    pub fn region(&self) -> Region {
        match self {
            Buffer::Edges(_) => Region::Edges,
            Buffer::Distances(_) => Region::Distances,
        }
    }

    /// Payload size as it would cross a physical transport.
    pub fn byte_len(&self) -> usize {
        match self {
            Buffer::Edges(e) => std::mem::size_of_val(e.as_slice()),
            Buffer::Distances(d) => std::mem::size_of_val(d.as_slice()),
        }
    }

    pub fn into_distances(self, worker: WorkerId) -> Result<Vec<Distance>, WorkerError> {
        match self {
            Buffer::Distances(d) => Ok(d),
            other => Err(WorkerError::RegionMismatch { worker, region: Region::Distances, found: other.region() }),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker {worker}: {found:?} data used for region {region:?}")]
    RegionMismatch { worker: WorkerId, region: Region, found: Region },

    #[error("worker {worker}: region {region:?} has not been copied in")]
    NotLoaded { worker: WorkerId, region: Region },

    #[error("worker {worker}: edge endpoint {vertex} outside a distance vector of {len} entries")]
    OutOfRange { worker: WorkerId, vertex: VertexId, len: usize },

    #[error("worker {worker}: copied out {found} distances, expected {expected}")]
    LengthMismatch { worker: WorkerId, expected: usize, found: usize },

    #[error("worker {worker} disconnected")]
    Disconnected { worker: WorkerId },

    #[error("failed to start worker {worker}: {source}")]
    Spawn { worker: WorkerId, #[source] source: std::io::Error },
}

/// An opaque unit of computation with private memory.
///
/// `launch` blocks until the kernel has finished; the host never observes a
/// half-relaxed vector.
pub trait Worker: Send {
    fn id(&self) -> WorkerId;
    fn copy_in(&mut self, region: Region, data: Buffer) -> Result<(), WorkerError>;
    fn launch(&mut self) -> Result<KernelStats, WorkerError>;
    fn copy_out(&mut self, region: Region) -> Result<Buffer, WorkerError>;
}

impl<W: Worker + ?Sized> Worker for Box<W> {
    fn id(&self) -> WorkerId { (**self).id() }
    fn copy_in(&mut self, region: Region, data: Buffer) -> Result<(), WorkerError> { (**self).copy_in(region, data) }
    fn launch(&mut self) -> Result<KernelStats, WorkerError> { (**self).launch() }
    fn copy_out(&mut self, region: Region) -> Result<Buffer, WorkerError> { (**self).copy_out(region) }
}

// ---------------- In-process worker ----------------

#[derive(Debug)]
pub struct LocalWorker {
    id: WorkerId,
    mode: RelaxMode,
    edges: Option<Vec<Edge>>,
    max_endpoint: Option<VertexId>,
    distances: Option<Vec<Distance>>,
}

impl LocalWorker {
    pub fn new(id: WorkerId, mode: RelaxMode) -> Self {
        Self { id, mode, edges: None, max_endpoint: None, distances: None }
    }
}

impl Worker for LocalWorker {
    fn id(&self) -> WorkerId { self.id }

    fn copy_in(&mut self, region: Region, data: Buffer) -> Result<(), WorkerError> {
        match (region, data) {
            (Region::Edges, Buffer::Edges(edges)) => {
                self.max_endpoint = edges.iter().map(|e| e.source.max(e.target)).max();
                self.edges = Some(edges);
            }
            (Region::Distances, Buffer::Distances(dist)) => self.distances = Some(dist),
            (region, data) => return Err(WorkerError::RegionMismatch { worker: self.id, region, found: data.region() }),
        }
        Ok(())
    }

    fn launch(&mut self) -> Result<KernelStats, WorkerError> {
        let edges = self.edges.as_deref().ok_or(WorkerError::NotLoaded { worker: self.id, region: Region::Edges })?;
        let dist = self.distances.as_deref_mut().ok_or(WorkerError::NotLoaded { worker: self.id, region: Region::Distances })?;
        if let Some(v) = self.max_endpoint {
            if v as usize >= dist.len() {
                return Err(WorkerError::OutOfRange { worker: self.id, vertex: v, len: dist.len() });
            }
        }
        let stats = relax_in_place(edges, dist, self.mode);
        trace!(worker = self.id, edges = edges.len(), passes = stats.passes, relaxations = stats.relaxations, "kernel finished");
        Ok(stats)
    }

    fn copy_out(&mut self, region: Region) -> Result<Buffer, WorkerError> {
        let not_loaded = WorkerError::NotLoaded { worker: self.id, region };
        match region {
            Region::Edges => self.edges.clone().map(Buffer::Edges).ok_or(not_loaded),
            Region::Distances => self.distances.clone().map(Buffer::Distances).ok_or(not_loaded),
        }
    }
}

// ---------------- Thread-backed worker ----------------

enum Command {
    CopyIn(Region, Buffer),
    Launch,
    CopyOut(Region),
    Shutdown,
}

enum Reply {
    Stored,
    Launched(KernelStats),
    Data(Buffer),
}

/// A [`LocalWorker`] living on its own thread. Each call sends one command
/// and blocks on the matching reply.
pub struct ThreadWorker {
    id: WorkerId,
    commands: Sender<Command>,
    replies: Receiver<Result<Reply, WorkerError>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadWorker {
    pub fn spawn(id: WorkerId, mode: RelaxMode) -> Result<Self, WorkerError> {
        let (commands, inbox) = channel::<Command>();
        let (outbox, replies) = channel::<Result<Reply, WorkerError>>();
        let handle = thread::Builder::new()
            .name(format!("sssp-worker-{id}"))
            .spawn(move || {
                let mut local = LocalWorker::new(id, mode);
                while let Ok(cmd) = inbox.recv() {
                    let reply = match cmd {
                        Command::CopyIn(region, data) => local.copy_in(region, data).map(|_| Reply::Stored),
                        Command::Launch => local.launch().map(Reply::Launched),
                        Command::CopyOut(region) => local.copy_out(region).map(Reply::Data),
                        Command::Shutdown => break,
                    };
                    if outbox.send(reply).is_err() {
                        break;
                    }
                }
            })
            .map_err(|source| WorkerError::Spawn { worker: id, source })?;
        Ok(Self { id, commands, replies, handle: Some(handle) })
    }

    fn call(&mut self, cmd: Command) -> Result<Reply, WorkerError> {
        let gone = || WorkerError::Disconnected { worker: self.id };
        self.commands.send(cmd).map_err(|_| gone())?;
        self.replies.recv().map_err(|_| gone())?
    }
}

impl Worker for ThreadWorker {
    fn id(&self) -> WorkerId { self.id }

    fn copy_in(&mut self, region: Region, data: Buffer) -> Result<(), WorkerError> {
        match self.call(Command::CopyIn(region, data))? {
            Reply::Stored => Ok(()),
            _ => Err(WorkerError::Disconnected { worker: self.id }),
        }
    }

    fn launch(&mut self) -> Result<KernelStats, WorkerError> {
        match self.call(Command::Launch)? {
            Reply::Launched(stats) => Ok(stats),
            _ => Err(WorkerError::Disconnected { worker: self.id }),
        }
    }

    fn copy_out(&mut self, region: Region) -> Result<Buffer, WorkerError> {
        match self.call(Command::CopyOut(region))? {
            Reply::Data(buf) => Ok(buf),
            _ => Err(WorkerError::Disconnected { worker: self.id }),
        }
    }
}

impl Drop for ThreadWorker {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{initial_distances, UNREACHABLE};

    fn chain() -> Vec<Edge> { vec![Edge::new(0, 1, 4), Edge::new(1, 2, -1)] }

    fn roundtrip<W: Worker>(w: &mut W) -> Vec<Distance> {
        w.copy_in(Region::Edges, Buffer::Edges(chain())).unwrap();
        w.copy_in(Region::Distances, Buffer::Distances(initial_distances(3, 0))).unwrap();
        let stats = w.launch().unwrap();
        assert!(stats.changed);
        w.copy_out(Region::Distances).unwrap().into_distances(w.id()).unwrap()
    }

    #[test]
    fn local_worker_copy_in_launch_copy_out() {
        let mut w = LocalWorker::new(0, RelaxMode::SinglePass);
        assert_eq!(roundtrip(&mut w), vec![0, 4, 3]);
    }

    #[test]
    fn thread_worker_matches_local() {
        let mut w = ThreadWorker::spawn(3, RelaxMode::SinglePass).unwrap();
        assert_eq!(roundtrip(&mut w), vec![0, 4, 3]);
        assert_eq!(w.id(), 3);
    }

    #[test]
    fn launch_before_copy_in_fails() {
        let mut w = LocalWorker::new(1, RelaxMode::SinglePass);
        assert!(matches!(w.launch(), Err(WorkerError::NotLoaded { region: Region::Edges, .. })));
        w.copy_in(Region::Edges, Buffer::Edges(chain())).unwrap();
        assert!(matches!(w.launch(), Err(WorkerError::NotLoaded { region: Region::Distances, .. })));
    }

    #[test]
    fn region_mismatch_rejected() {
        let mut w = LocalWorker::new(2, RelaxMode::SinglePass);
        let err = w.copy_in(Region::Edges, Buffer::Distances(vec![0])).unwrap_err();
        assert!(matches!(err, WorkerError::RegionMismatch { region: Region::Edges, found: Region::Distances, .. }));
    }

    #[test]
    fn short_distance_vector_is_out_of_range() {
        let mut w = ThreadWorker::spawn(0, RelaxMode::SinglePass).unwrap();
        w.copy_in(Region::Edges, Buffer::Edges(chain())).unwrap();
        w.copy_in(Region::Distances, Buffer::Distances(vec![0, UNREACHABLE])).unwrap();
        assert!(matches!(w.launch(), Err(WorkerError::OutOfRange { vertex: 2, len: 2, .. })));
    }

    #[test]
    fn byte_len_counts_payload() {
        assert_eq!(Buffer::Distances(vec![0; 4]).byte_len(), 32);
        assert_eq!(Buffer::Edges(chain()).byte_len(), 24);
    }
}
