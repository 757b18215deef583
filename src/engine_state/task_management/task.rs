//! # Streaming Requests and Mesh Notifications
//!
//! This module defines the messages that flow through the streaming engine:
//! - `ChunkChange`: a load or unload request, sent from the simulation thread to the
//!   streaming worker
//! - `MeshBuilder`: the outbound seam through which the worker tells the renderer which
//!   faces of a chunk must be drawn
//!
//! ## Ordering
//! Requests travel through a single FIFO channel and are handled one at a time, so a
//! `Load(c)` followed by an `Unload(c)` is always applied in that order. Mesh builder
//! calls happen on the worker thread in the same order as the requests that caused
//! them.

use std::fmt;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

use crate::engine_state::voxels::{block::ExposedBlock, chunk::ChunkId};

/// A request for the streaming worker.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ChunkChange {
    /// Generate the chunk, register it in the world and publish its geometry.
    Load(ChunkId),
    /// Drop the chunk from the world and withdraw its geometry.
    Unload(ChunkId),
}

impl ChunkChange {
    /// The chunk this request refers to.
    pub fn chunk(&self) -> ChunkId {
        match self {
            ChunkChange::Load(chunk) | ChunkChange::Unload(chunk) => *chunk,
        }
    }
}

impl fmt::Display for ChunkChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkChange::Load(chunk) => write!(f, "load {chunk}"),
            ChunkChange::Unload(chunk) => write!(f, "unload {chunk}"),
        }
    }
}

/// Receives the per-chunk exposed face sets produced by the streaming engine.
///
/// Implementations are called from the streaming worker thread (and from the caller's
/// thread during startup), so they must be `Send + Sync` and should return quickly.
///
/// # Implementation Guidelines
/// - A `chunk_loaded` for a chunk that already has geometry replaces it; this happens
///   when a neighbouring chunk changed and the boundary faces had to be recomputed
/// - `chunk_unloaded` is only sent for chunks that were previously loaded
pub trait MeshBuilder: Send + Sync {
    /// The chunk is resident and these are its blocks with at least one visible face.
    fn chunk_loaded(&self, chunk: ChunkId, blocks: Vec<ExposedBlock>);

    /// The chunk left the world; its geometry must be discarded.
    fn chunk_unloaded(&self, chunk: ChunkId);
}

/// A mesh builder notification in message form.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshEvent {
    /// See [`MeshBuilder::chunk_loaded`].
    Loaded(ChunkId, Vec<ExposedBlock>),
    /// See [`MeshBuilder::chunk_unloaded`].
    Unloaded(ChunkId),
}

/// Forwards every notification over an mpsc channel, for a render thread that drains
/// the events once per frame.
///
/// Events sent after the receiver was dropped are discarded.
pub struct ChannelMeshBuilder {
    sender: Mutex<Sender<MeshEvent>>,
}

impl ChannelMeshBuilder {
    /// Creates the builder and the receiving end of its channel.
    pub fn channel() -> (Self, Receiver<MeshEvent>) {
        let (sender, receiver) = std::sync::mpsc::channel();
        (
            ChannelMeshBuilder {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }

    fn send(&self, event: MeshEvent) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(event);
        }
    }
}

impl MeshBuilder for ChannelMeshBuilder {
    fn chunk_loaded(&self, chunk: ChunkId, blocks: Vec<ExposedBlock>) {
        self.send(MeshEvent::Loaded(chunk, blocks));
    }

    fn chunk_unloaded(&self, chunk: ChunkId) {
        self.send(MeshEvent::Unloaded(chunk));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_side::FaceSet, Block};

    #[test]
    fn channel_builder_forwards_events_in_order() {
        let (builder, receiver) = ChannelMeshBuilder::channel();
        let chunk = ChunkId::new(1, 2, 3);
        let exposed = vec![ExposedBlock {
            block: Block::new(16, 32, 48),
            faces: FaceSet::all(),
        }];

        builder.chunk_loaded(chunk, exposed.clone());
        builder.chunk_unloaded(chunk);

        assert_eq!(receiver.try_recv().unwrap(), MeshEvent::Loaded(chunk, exposed));
        assert_eq!(receiver.try_recv().unwrap(), MeshEvent::Unloaded(chunk));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn sending_after_receiver_dropped_is_silent() {
        let (builder, receiver) = ChannelMeshBuilder::channel();
        drop(receiver);
        builder.chunk_unloaded(ChunkId::new(0, 0, 0));
    }

    #[test]
    fn change_reports_its_chunk() {
        let chunk = ChunkId::new(-1, 0, 4);
        assert_eq!(ChunkChange::Load(chunk).chunk(), chunk);
        assert_eq!(ChunkChange::Unload(chunk).chunk(), chunk);
        assert_eq!(ChunkChange::Load(chunk).to_string(), "load chunk (-1, 0, 4)");
    }
}
