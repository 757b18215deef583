//! # Chunk Streaming Engine
//!
//! This module keeps the resident part of the world in step with the player's
//! position. Load and unload requests are handed to a single background worker so
//! terrain generation never stalls the simulation thread.
//!
//! ## Architecture Overview
//!
//! - `ChunkStreamer`: owns the request channel and the worker thread
//! - `ChunkChange`: a unit of work, see [`task`]
//! - `ChunkChangeTask`: applies one change to the shared world
//! - `WorkerStatus`: shared between the streamer and the worker; counts requests that
//!   have not been applied yet and records why the worker stopped
//!
//! ## Request Lifecycle
//! 1. The simulation thread publishes requests via `ChunkStreamer::publish()` or, when
//!    the player crossed a chunk boundary, `ChunkStreamer::on_player_chunk_changed()`
//! 2. The worker blocks on the channel and receives requests in FIFO order
//! 3. Each request is applied to the world under the write lock and the mesh builder
//!    is notified
//! 4. The pending count drops; `wait_until_idle()` wakes once it reaches zero
//!
//! ## Failure Handling
//! A request that violates a world invariant stops the worker for good. The failure is
//! logged, recorded in the status, and every later call to `publish()` or
//! `check_health()` returns it. Requests still in the channel are dropped.
//!
//! ## Example Usage
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use voxel_world::{core::MtResource, ChunkChange, ChunkChangeTask, ChunkId,
//! #     ChunkStreamer, ChannelMeshBuilder, TerrainGenerator, TerrainParams, World};
//! let world = MtResource::new(World::new());
//! let generator = Arc::new(TerrainGenerator::new(1, TerrainParams::default())?);
//! let (mesh_builder, _events) = ChannelMeshBuilder::channel();
//! let task = ChunkChangeTask::new(world, generator, Arc::new(mesh_builder), true);
//!
//! let streamer = ChunkStreamer::new(task, 3)?;
//! streamer.publish(ChunkChange::Load(ChunkId::new(0, 3, 0)))?;
//! streamer.on_player_chunk_changed(ChunkId::new(0, 3, 0), ChunkId::new(1, 3, 0))?;
//! # Ok::<(), voxel_world::error::EngineError>(())
//! ```

pub mod task;

use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use task::ChunkChange;

use super::voxels::{
    chunk::{neighboring_chunks, sort_by_distance, ChunkDiff, ChunkId},
    tasks::chunk_change_task::ChunkChangeTask,
    world::World,
};
use crate::error::EngineError;

#[derive(Debug, Default)]
struct StatusState {
    /// Requests published but not yet applied
    pending: usize,
    /// Set when a request failed; the worker is gone afterwards
    failure: Option<String>,
    /// Set when the worker thread exited for any reason, including a panic
    stopped: bool,
    /// Set when the streamer is dropped; queued requests are discarded
    shutdown: bool,
}

/// Progress and health of the streaming worker, shared between both threads.
#[derive(Debug, Default)]
struct WorkerStatus {
    state: Mutex<StatusState>,
    changed: Condvar,
}

impl WorkerStatus {
    fn lock(&self) -> MutexGuard<'_, StatusState> {
        // no code panics while holding this lock
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn health(state: &StatusState) -> Result<(), EngineError> {
        if let Some(failure) = &state.failure {
            return Err(EngineError::WorkerFailed(failure.clone()));
        }
        if state.stopped {
            return Err(EngineError::WorkerDisconnected);
        }
        Ok(())
    }

    fn completed(&self) {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);
        drop(state);
        self.changed.notify_all();
    }

    fn failed(&self, reason: String) {
        self.lock().failure = Some(reason);
        self.changed.notify_all();
    }
}

/// Marks the worker as stopped when the worker closure exits, even by unwinding.
struct StopGuard(Arc<WorkerStatus>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.lock().stopped = true;
        self.0.changed.notify_all();
    }
}

/// Streams chunks in and out of the world on one background worker thread.
///
/// # Fields
/// - `sender`: FIFO request channel into the worker
/// - `task`: the change applier, also used directly by `load_blocking()`
/// - `status`: pending count and failure state shared with the worker
/// - `radius`: Euclidean radius of the resident neighbourhood, in chunks
/// - `worker`: joined when the streamer is dropped
pub struct ChunkStreamer {
    sender: Option<Sender<ChunkChange>>,
    task: ChunkChangeTask,
    status: Arc<WorkerStatus>,
    radius: i32,
    worker: Option<JoinHandle<()>>,
}

impl ChunkStreamer {
    /// Starts the worker thread.
    ///
    /// # Errors
    /// [`EngineError::WorkerSpawn`] if the operating system refuses to create the thread.
    pub fn new(task: ChunkChangeTask, radius: i32) -> Result<Self, EngineError> {
        let (sender, receiver) = channel::<ChunkChange>();
        let status = Arc::new(WorkerStatus::default());

        let worker_task = task.clone();
        let worker_status = status.clone();
        let worker = thread::Builder::new()
            .name("chunk-streamer".to_string())
            .spawn(move || {
                let _guard = StopGuard(worker_status.clone());
                info!("Chunk streaming worker started");
                while let Ok(change) = receiver.recv() {
                    if worker_status.lock().shutdown {
                        break;
                    }
                    match worker_task.process(change) {
                        Ok(()) => worker_status.completed(),
                        Err(err) => {
                            error!("Chunk streaming worker failed on {change}: {err}");
                            worker_status.failed(format!("{change}: {err}"));
                            return;
                        }
                    }
                }
                info!("Chunk streaming worker stopped");
            })
            .map_err(EngineError::WorkerSpawn)?;

        Ok(ChunkStreamer {
            sender: Some(sender),
            task,
            status,
            radius,
            worker: Some(worker),
        })
    }

    /// Euclidean radius of the resident neighbourhood, in chunks.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Returns the recorded worker failure, if any.
    pub fn check_health(&self) -> Result<(), EngineError> {
        WorkerStatus::health(&self.status.lock())
    }

    /// Queues a request for the worker. Never blocks on the worker.
    pub fn publish(&self, change: ChunkChange) -> Result<(), EngineError> {
        let mut state = self.status.lock();
        WorkerStatus::health(&state)?;
        let sender = self.sender.as_ref().ok_or(EngineError::WorkerDisconnected)?;
        sender
            .send(change)
            .map_err(|_| EngineError::WorkerDisconnected)?;
        state.pending += 1;
        Ok(())
    }

    /// Applies a load request on the calling thread, bypassing the queue.
    ///
    /// Only used before anything has been queued, so ordering with the worker is
    /// preserved.
    pub fn load_blocking(&self, chunk: ChunkId) -> Result<(), EngineError> {
        self.task.process(ChunkChange::Load(chunk))?;
        Ok(())
    }

    /// Queues loads for every chunk of the neighbourhood around `center` that is not
    /// resident, nearest first, and unloads for resident chunks outside it.
    ///
    /// Returns the number of queued requests.
    pub fn fill_neighborhood(&self, center: ChunkId, world: &World) -> Result<usize, EngineError> {
        let wanted = neighboring_chunks(center, self.radius);

        let mut to_load: Vec<ChunkId> = wanted
            .iter()
            .copied()
            .filter(|chunk| !world.is_resident(*chunk))
            .collect();
        sort_by_distance(&mut to_load, center);

        let mut to_unload: Vec<ChunkId> = world
            .resident_chunks()
            .filter(|chunk| !wanted.contains(chunk))
            .collect();
        sort_by_distance(&mut to_unload, center);

        for chunk in &to_load {
            self.publish(ChunkChange::Load(*chunk))?;
        }
        for chunk in &to_unload {
            self.publish(ChunkChange::Unload(*chunk))?;
        }
        debug!(
            "Filling neighbourhood of {center}: {} loads, {} unloads",
            to_load.len(),
            to_unload.len()
        );
        Ok(to_load.len() + to_unload.len())
    }

    /// Streams the difference between the neighbourhoods of `before` and `after`.
    ///
    /// Loads are queued nearest-first ahead of the unloads.
    pub fn on_player_chunk_changed(
        &self,
        before: ChunkId,
        after: ChunkId,
    ) -> Result<ChunkDiff, EngineError> {
        let diff = ChunkDiff::between(before, after, self.radius);
        for chunk in &diff.to_load {
            self.publish(ChunkChange::Load(*chunk))?;
        }
        for chunk in &diff.to_unload {
            self.publish(ChunkChange::Unload(*chunk))?;
        }
        debug!(
            "Player moved from {before} to {after}: {} loads, {} unloads",
            diff.to_load.len(),
            diff.to_unload.len()
        );
        Ok(diff)
    }

    /// Requests published but not yet applied by the worker.
    pub fn pending(&self) -> usize {
        self.status.lock().pending
    }

    /// Blocks until every published request has been applied or `timeout` elapsed.
    ///
    /// Returns `Ok(true)` when the queue drained and `Ok(false)` on timeout.
    ///
    /// # Errors
    /// The worker failure, if the worker stopped before the queue drained.
    pub fn wait_until_idle(&self, timeout: Duration) -> Result<bool, EngineError> {
        let state = self.status.lock();
        let (state, _) = self
            .status
            .changed
            .wait_timeout_while(state, timeout, |state| {
                state.pending > 0 && state.failure.is_none() && !state.stopped
            })
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.pending == 0 {
            return Ok(true);
        }
        WorkerStatus::health(&state)?;
        Ok(false)
    }
}

impl Drop for ChunkStreamer {
    fn drop(&mut self) {
        self.status.lock().shutdown = true;
        // closing the channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Chunk streaming worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::voxels::terrain::{TerrainGenerator, TerrainParams};
    use task::{ChannelMeshBuilder, MeshEvent};

    fn streamer(radius: i32) -> (ChunkStreamer, MtResource<World>, std::sync::mpsc::Receiver<MeshEvent>) {
        let world = MtResource::new(World::new());
        let generator = Arc::new(TerrainGenerator::new(9, TerrainParams::default()).unwrap());
        let (builder, events) = ChannelMeshBuilder::channel();
        let task = ChunkChangeTask::new(world.clone(), generator, Arc::new(builder), false);
        (ChunkStreamer::new(task, radius).unwrap(), world, events)
    }

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn requests_are_applied_in_order() {
        let (streamer, world, events) = streamer(1);
        let chunk = ChunkId::new(0, 3, 0);
        streamer.publish(ChunkChange::Load(chunk)).unwrap();
        streamer.publish(ChunkChange::Unload(chunk)).unwrap();
        streamer.publish(ChunkChange::Load(chunk)).unwrap();
        assert!(streamer.wait_until_idle(TIMEOUT).unwrap());

        assert_eq!(streamer.pending(), 0);
        assert!(world.get().unwrap().is_resident(chunk));
        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert!(matches!(received[1], MeshEvent::Unloaded(c) if c == chunk));
    }

    #[test]
    fn fill_then_move_keeps_the_ball_resident() {
        let (streamer, world, _events) = streamer(2);
        let start = ChunkId::new(0, 4, 0);
        streamer.load_blocking(ChunkId::new(5, 4, 5)).unwrap();

        let queued = streamer
            .fill_neighborhood(start, &world.get().unwrap())
            .unwrap();
        assert_eq!(queued, neighboring_chunks(start, 2).len() + 1);
        assert!(streamer.wait_until_idle(TIMEOUT).unwrap());

        let next = ChunkId::new(1, 4, 0);
        let diff = streamer.on_player_chunk_changed(start, next).unwrap();
        assert!(!diff.is_empty());
        assert!(streamer.wait_until_idle(TIMEOUT).unwrap());

        let resident: std::collections::HashSet<_> =
            world.get().unwrap().resident_chunks().collect();
        assert_eq!(resident, neighboring_chunks(next, 2));
    }

    #[test]
    fn worker_failure_is_sticky() {
        let (streamer, _world, _events) = streamer(1);
        streamer
            .publish(ChunkChange::Unload(ChunkId::new(0, 0, 0)))
            .unwrap();
        assert!(matches!(
            streamer.wait_until_idle(TIMEOUT),
            Err(EngineError::WorkerFailed(_))
        ));
        assert!(matches!(
            streamer.check_health(),
            Err(EngineError::WorkerFailed(_))
        ));
        assert!(matches!(
            streamer.publish(ChunkChange::Load(ChunkId::new(0, 0, 0))),
            Err(EngineError::WorkerFailed(_))
        ));
    }
}
