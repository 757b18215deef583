//! # Block Module
//!
//! This module provides the block coordinate type and block face handling.
//!
//! There is a single block material in the world, so a block is nothing more than
//! the integer position of a solid unit cube. The cube of block `(x, y, z)` spans
//! `[x - 0.5, x + 0.5]` on every axis, i.e. block coordinates are cube centres.

use std::fmt;

use cgmath::{Point3, Vector3};

use super::chunk::ChunkId;
use block_side::{BlockSide, FaceSet};

pub mod block_side;

/// Represents a single solid voxel in the world, identified by its integer position.
///
/// Equality and hashing are by value, so blocks can be used directly as members of
/// the world's hash set.
///
/// # Examples
///
/// ```
/// use voxel_world::{Block, ChunkId};
///
/// let block = Block::new(-1, 0, 17);
/// assert_eq!(block.chunk(), ChunkId::new(-1, 0, 1));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Block(pub Point3<i32>);

impl Block {
    /// Creates a block at the given integer coordinates.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Block(Point3::new(x, y, z))
    }

    /// Returns the block whose unit cube contains `point`.
    ///
    /// Each coordinate is rounded half-up (`floor(v + 0.5)`), so a point on the shared
    /// face of two cubes belongs to the block with the larger coordinate.
    pub fn containing(point: Point3<f32>) -> Self {
        Block::new(
            (point.x + 0.5).floor() as i32,
            (point.y + 0.5).floor() as i32,
            (point.z + 0.5).floor() as i32,
        )
    }

    /// The chunk this block belongs to.
    pub fn chunk(&self) -> ChunkId {
        ChunkId::of_block(*self)
    }

    /// The adjacent block across `side`.
    pub fn neighbor(&self, side: BlockSide) -> Block {
        Block(self.0 + side.normal())
    }

    /// Returns this block moved by `offset`.
    pub fn offset(&self, offset: Vector3<i32>) -> Block {
        Block(self.0 + offset)
    }

    /// Centre of the block's unit cube in world space.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(self.0.x as f32, self.0.y as f32, self.0.z as f32)
    }

    /// A total order key used wherever block processing order has to be deterministic.
    pub fn sort_key(&self) -> (i32, i32, i32) {
        (self.0.y, self.0.x, self.0.z)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block ({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

/// A block together with the faces of it that border empty space.
///
/// This is the unit of data handed to the external mesh builder.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ExposedBlock {
    /// The solid block.
    pub block: Block,
    /// Faces that have no solid neighbour and need to be drawn.
    pub faces: FaceSet,
}
