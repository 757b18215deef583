//! # World Module
//!
//! This module provides the `World` struct, the authoritative set of resident blocks.
//!
//! ## Architecture
//!
//! The world keeps two views of the same data:
//! - a hash set of every resident block, which answers membership queries in O(1)
//!   for collision checks and face exposure
//! - an index from chunk id to the blocks of that chunk, which makes unloading a
//!   chunk proportional to its own size
//!
//! Both views are only ever changed together, inside `add_chunk` and `remove_chunk`.
//! Callers share the world through an `MtResource`, so a reader holding the lock never
//! sees a block that is present in one view and missing from the other.
//!
//! A chunk is resident as soon as it has an entry in the index, even when it holds no
//! blocks (air chunks and chunks outside the terrain band).

use std::collections::{HashMap, HashSet};

use super::block::{
    block_side::{BlockSide, FaceSet},
    Block, ExposedBlock,
};
use super::chunk::ChunkId;
use crate::error::WorldError;

/// Represents the resident part of the voxel world.
///
/// # Examples
///
/// ```
/// use voxel_world::{Block, ChunkId, World};
///
/// let mut world = World::new();
/// world.add_chunk(ChunkId::new(0, 0, 0), vec![Block::new(1, 2, 3)]).unwrap();
/// assert!(world.contains(&Block::new(1, 2, 3)));
///
/// let removed = world.remove_chunk(ChunkId::new(0, 0, 0)).unwrap();
/// assert_eq!(removed, vec![Block::new(1, 2, 3)]);
/// assert!(!world.contains(&Block::new(1, 2, 3)));
/// ```
#[derive(Debug, Default)]
pub struct World {
    /// Every resident block.
    blocks: HashSet<Block>,
    /// Blocks of each resident chunk, in generation order.
    chunks: HashMap<ChunkId, Vec<Block>>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            blocks: HashSet::new(),
            chunks: HashMap::new(),
        }
    }

    /// Returns `true` if `block` is a resident solid block.
    pub fn contains(&self, block: &Block) -> bool {
        self.blocks.contains(block)
    }

    /// Returns `true` if any of `blocks` is resident.
    pub fn intersects<'a, I>(&self, blocks: I) -> bool
    where
        I: IntoIterator<Item = &'a Block>,
    {
        blocks.into_iter().any(|block| self.blocks.contains(block))
    }

    /// Returns `true` if `chunk` has been added and not removed since.
    pub fn is_resident(&self, chunk: ChunkId) -> bool {
        self.chunks.contains_key(&chunk)
    }

    /// Registers `chunk` as resident with the given blocks.
    ///
    /// # Errors
    /// - [`WorldError::ChunkAlreadyResident`] if the chunk is already resident
    /// - [`WorldError::BlockOutsideChunk`] if a block does not derive to `chunk`
    /// - [`WorldError::DuplicateBlock`] if a block is listed twice
    ///
    /// The world is left untouched when an error is returned.
    pub fn add_chunk(&mut self, chunk: ChunkId, blocks: Vec<Block>) -> Result<(), WorldError> {
        if self.chunks.contains_key(&chunk) {
            return Err(WorldError::ChunkAlreadyResident(chunk));
        }
        if let Some(stray) = blocks.iter().find(|block| !chunk.contains(**block)) {
            return Err(WorldError::BlockOutsideChunk {
                block: *stray,
                chunk,
            });
        }
        let mut distinct = HashSet::with_capacity(blocks.len());
        if let Some(duplicate) = blocks.iter().find(|block| !distinct.insert(**block)) {
            return Err(WorldError::DuplicateBlock(*duplicate));
        }

        self.blocks.extend(blocks.iter().copied());
        self.chunks.insert(chunk, blocks);
        Ok(())
    }

    /// Removes `chunk` and all of its blocks, returning the removed blocks.
    ///
    /// # Errors
    /// [`WorldError::ChunkNotResident`] if the chunk was never added or is already gone.
    pub fn remove_chunk(&mut self, chunk: ChunkId) -> Result<Vec<Block>, WorldError> {
        let blocks = self
            .chunks
            .remove(&chunk)
            .ok_or(WorldError::ChunkNotResident(chunk))?;
        for block in &blocks {
            self.blocks.remove(block);
        }
        Ok(blocks)
    }

    /// Faces of `block` whose neighbour is not resident.
    ///
    /// Neighbours are looked up in the global block set, so faces on a chunk boundary
    /// are resolved against the adjacent chunk when it is loaded.
    pub fn exposed_faces(&self, block: &Block) -> FaceSet {
        BlockSide::all()
            .into_iter()
            .filter(|side| !self.blocks.contains(&block.neighbor(*side)))
            .collect()
    }

    /// Blocks of `chunk` with at least one exposed face, in the chunk's block order.
    ///
    /// Returns an empty list for a chunk that is not resident.
    pub fn exposed_blocks(&self, chunk: ChunkId) -> Vec<ExposedBlock> {
        let Some(blocks) = self.chunks.get(&chunk) else {
            return Vec::new();
        };

        blocks
            .iter()
            .map(|block| ExposedBlock {
                block: *block,
                faces: self.exposed_faces(block),
            })
            .filter(|exposed| !exposed.faces.is_empty())
            .collect()
    }

    /// Resident chunks sharing a face with `chunk`.
    pub fn resident_face_neighbors(&self, chunk: ChunkId) -> Vec<ChunkId> {
        BlockSide::all()
            .into_iter()
            .map(|side| chunk.offset(side.normal()))
            .filter(|neighbor| self.chunks.contains_key(neighbor))
            .collect()
    }

    /// The resident block with the greatest `y` in the column at `(x, z)`.
    ///
    /// Only resident chunks are searched, so the answer is only meaningful once the
    /// whole vertical column of chunks around `(x, z)` has been loaded.
    pub fn highest_block_at(&self, x: i32, z: i32) -> Option<Block> {
        let column = Block::new(x, 0, z).chunk();
        self.chunks
            .iter()
            .filter(|(chunk, _)| chunk.0.x == column.0.x && chunk.0.z == column.0.z)
            .flat_map(|(_, blocks)| blocks.iter())
            .filter(|block| block.0.x == x && block.0.z == z)
            .max_by_key(|block| block.0.y)
            .copied()
    }

    /// Ids of all resident chunks, in no particular order.
    pub fn resident_chunks(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.chunks.keys().copied()
    }

    /// Blocks registered for `chunk`, if it is resident.
    pub fn chunk_blocks(&self, chunk: ChunkId) -> Option<&[Block]> {
        self.chunks.get(&chunk).map(Vec::as_slice)
    }

    /// Number of resident blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn cube(chunk: ChunkId, size: i32) -> Vec<Block> {
        let origin = chunk.origin();
        let mut blocks = Vec::new();
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    blocks.push(origin.offset(Vector3::new(x, y, z)));
                }
            }
        }
        blocks
    }

    fn assert_consistent(world: &World) {
        let mut union = HashSet::new();
        let mut total = 0;
        for chunk in world.resident_chunks() {
            let blocks = world.chunk_blocks(chunk).unwrap();
            total += blocks.len();
            for block in blocks {
                assert_eq!(block.chunk(), chunk);
                union.insert(*block);
            }
        }
        assert_eq!(total, union.len(), "a block is listed twice");
        assert_eq!(union, world.blocks);
    }

    #[test]
    fn add_and_remove_keep_views_consistent() {
        let mut world = World::new();
        let a = ChunkId::new(0, 0, 0);
        let b = ChunkId::new(-1, 0, 0);
        let c = ChunkId::new(0, 3, -2);

        world.add_chunk(a, cube(a, 3)).unwrap();
        assert_consistent(&world);
        world.add_chunk(b, cube(b, 2)).unwrap();
        world.add_chunk(c, Vec::new()).unwrap();
        assert_consistent(&world);
        assert_eq!(world.chunk_count(), 3);
        assert_eq!(world.block_count(), 27 + 8);

        let removed = world.remove_chunk(a).unwrap();
        assert_eq!(removed.len(), 27);
        assert_consistent(&world);
        assert!(!world.is_resident(a));
        assert!(world.is_resident(c));

        world.add_chunk(a, cube(a, 1)).unwrap();
        world.remove_chunk(b).unwrap();
        world.remove_chunk(c).unwrap();
        assert_consistent(&world);
        assert_eq!(world.block_count(), 1);
    }

    #[test]
    fn invariant_violations_are_rejected() {
        let mut world = World::new();
        let chunk = ChunkId::new(1, 1, 1);
        world.add_chunk(chunk, cube(chunk, 1)).unwrap();

        assert!(matches!(
            world.add_chunk(chunk, Vec::new()),
            Err(WorldError::ChunkAlreadyResident(c)) if c == chunk
        ));
        assert!(matches!(
            world.remove_chunk(ChunkId::new(9, 9, 9)),
            Err(WorldError::ChunkNotResident(_))
        ));
        assert!(matches!(
            world.add_chunk(ChunkId::new(0, 0, 0), vec![Block::new(-1, 0, 0)]),
            Err(WorldError::BlockOutsideChunk { .. })
        ));
        assert!(!world.is_resident(ChunkId::new(0, 0, 0)));

        let repeated = Block::new(2, 3, 4);
        assert!(matches!(
            world.add_chunk(ChunkId::new(0, 0, 0), vec![repeated, Block::new(0, 0, 0), repeated]),
            Err(WorldError::DuplicateBlock(b)) if b == repeated
        ));
        assert!(!world.is_resident(ChunkId::new(0, 0, 0)));
        assert!(!world.contains(&repeated));
        assert_eq!(world.block_count(), 1);
        assert_consistent(&world);
    }

    #[test]
    fn isolated_block_exposes_every_face() {
        let mut world = World::new();
        let block = Block::new(5, 5, 5);
        world.add_chunk(block.chunk(), vec![block]).unwrap();
        assert_eq!(world.exposed_faces(&block), FaceSet::all());
    }

    #[test]
    fn enclosed_block_exposes_nothing() {
        let mut world = World::new();
        let chunk = ChunkId::new(0, 0, 0);
        world.add_chunk(chunk, cube(chunk, 3)).unwrap();

        let center = Block::new(1, 1, 1);
        assert!(world.exposed_faces(&center).is_empty());

        let corner = Block::new(0, 0, 0);
        let faces = world.exposed_faces(&corner);
        assert_eq!(faces.len(), 3);
        assert!(faces.contains(BlockSide::LEFT));
        assert!(faces.contains(BlockSide::BOTTOM));
        assert!(faces.contains(BlockSide::BACK));

        let exposed = world.exposed_blocks(chunk);
        assert_eq!(exposed.len(), 26);
        assert!(exposed.iter().all(|e| e.block != center));
    }

    #[test]
    fn exposure_is_resolved_across_chunk_boundaries() {
        let mut world = World::new();
        let left = Block::new(-1, 0, 0);
        let right = Block::new(0, 0, 0);
        world.add_chunk(left.chunk(), vec![left]).unwrap();
        assert!(world.exposed_faces(&left).contains(BlockSide::RIGHT));

        world.add_chunk(right.chunk(), vec![right]).unwrap();
        assert!(!world.exposed_faces(&left).contains(BlockSide::RIGHT));
        assert!(!world.exposed_faces(&right).contains(BlockSide::LEFT));
        assert_eq!(world.resident_face_neighbors(right.chunk()), vec![left.chunk()]);

        world.remove_chunk(right.chunk()).unwrap();
        assert!(world.exposed_faces(&left).contains(BlockSide::RIGHT));
    }

    #[test]
    fn highest_block_searches_resident_column() {
        let mut world = World::new();
        let low = Block::new(3, 10, -4);
        let high = Block::new(3, 40, -4);
        let elsewhere = Block::new(4, 60, -4);
        world.add_chunk(low.chunk(), vec![low]).unwrap();
        world.add_chunk(high.chunk(), vec![high]).unwrap();
        world.add_chunk(elsewhere.chunk(), vec![elsewhere]).unwrap();

        assert_eq!(world.highest_block_at(3, -4), Some(high));
        assert_eq!(world.highest_block_at(2, -4), None);
        assert!(world.intersects(&[Block::new(0, 0, 0), low]));
        assert!(!world.intersects(&[Block::new(0, 0, 0)]));
    }
}
