//! # Chunk Module
//!
//! This module provides the `ChunkId` type and the chunk-space geometry the streaming
//! engine relies on.
//!
//! A chunk is a 16x16x16 cube of blocks and the unit of loading and unloading. Chunk
//! coordinates are derived from block coordinates by floor division, so block `-1`
//! lives in chunk `-1` and not in chunk `0`.
//!
//! ## Resident Neighbourhood
//!
//! The chunks kept in memory around the player form a Euclidean ball in chunk space
//! (`dx² + dy² + dz² <= r²`) rather than a cube. When the player crosses a chunk
//! boundary the difference between the old and the new ball is all that has to be
//! streamed, see [`ChunkDiff::between`].

use std::collections::HashSet;
use std::fmt;

use cgmath::{Point3, Vector3};

use super::block::Block;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Identifies a chunk by its position in chunk coordinates (not block coordinates).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChunkId(pub Point3<i32>);

impl ChunkId {
    /// Creates a chunk id from chunk coordinates.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkId(Point3::new(x, y, z))
    }

    /// The chunk that owns `block`, using floor division on every axis.
    pub fn of_block(block: Block) -> Self {
        ChunkId::new(
            block.0.x.div_euclid(CHUNK_DIMENSION),
            block.0.y.div_euclid(CHUNK_DIMENSION),
            block.0.z.div_euclid(CHUNK_DIMENSION),
        )
    }

    /// The chunk containing a continuous world position.
    pub fn of_position(position: Point3<f32>) -> Self {
        ChunkId::of_block(Block::containing(position))
    }

    /// The block with the smallest coordinates inside this chunk.
    pub fn origin(&self) -> Block {
        Block::new(
            self.0.x * CHUNK_DIMENSION,
            self.0.y * CHUNK_DIMENSION,
            self.0.z * CHUNK_DIMENSION,
        )
    }

    /// Returns `true` if `block` lies inside this chunk.
    pub fn contains(&self, block: Block) -> bool {
        ChunkId::of_block(block) == *self
    }

    /// Returns this chunk id moved by `offset` chunks.
    pub fn offset(&self, offset: Vector3<i32>) -> ChunkId {
        ChunkId(self.0 + offset)
    }

    /// Squared Euclidean distance to `other`, in chunks.
    pub fn distance_squared(&self, other: ChunkId) -> i32 {
        let dx = self.0.x - other.0.x;
        let dy = self.0.y - other.0.y;
        let dz = self.0.z - other.0.z;
        dx * dx + dy * dy + dz * dz
    }

    fn order_key(&self, center: ChunkId) -> (i32, i32, i32, i32) {
        (self.distance_squared(center), self.0.y, self.0.x, self.0.z)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk ({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

/// Returns every chunk within Euclidean `radius` of `center`, measured in chunks.
///
/// A negative radius yields an empty set.
pub fn neighboring_chunks(center: ChunkId, radius: i32) -> HashSet<ChunkId> {
    let mut result = HashSet::new();
    let radius_squared = radius * radius;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                if dx * dx + dy * dy + dz * dz <= radius_squared {
                    result.insert(center.offset(Vector3::new(dx, dy, dz)));
                }
            }
        }
    }
    result
}

/// Orders chunks nearest-first around `center`, ties broken by coordinates.
pub fn sort_by_distance(chunks: &mut [ChunkId], center: ChunkId) {
    chunks.sort_by_key(|chunk| chunk.order_key(center));
}

/// The chunks to stream in and out after the player moved between two chunks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkDiff {
    /// Chunks that entered the neighbourhood, nearest to the new centre first.
    pub to_load: Vec<ChunkId>,
    /// Chunks that left the neighbourhood, nearest to the old centre first.
    pub to_unload: Vec<ChunkId>,
}

impl ChunkDiff {
    /// Computes `N(after) \ N(before)` and `N(before) \ N(after)` for balls of `radius`.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxel_world::{ChunkDiff, ChunkId};
    ///
    /// let diff = ChunkDiff::between(ChunkId::new(0, 0, 0), ChunkId::new(1, 0, 0), 1);
    /// assert_eq!(diff.to_load.len(), 5);
    /// assert_eq!(diff.to_unload.len(), 5);
    /// ```
    pub fn between(before: ChunkId, after: ChunkId, radius: i32) -> Self {
        if before == after {
            return ChunkDiff::default();
        }

        let old = neighboring_chunks(before, radius);
        let new = neighboring_chunks(after, radius);

        let mut to_load: Vec<ChunkId> = new.difference(&old).copied().collect();
        let mut to_unload: Vec<ChunkId> = old.difference(&new).copied().collect();
        sort_by_distance(&mut to_load, after);
        sort_by_distance(&mut to_unload, before);

        ChunkDiff { to_load, to_unload }
    }

    /// Returns `true` if nothing has to be streamed.
    pub fn is_empty(&self) -> bool {
        self.to_load.is_empty() && self.to_unload.is_empty()
    }
}
