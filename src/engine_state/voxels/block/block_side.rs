//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block and a compact set
//! type for the faces that are exposed to air and therefore need geometry.

use std::fmt;

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Represents the six possible faces of a voxel block.
///
/// Each variant corresponds to a specific face and is assigned a unique integer value
/// which doubles as its bit index inside a [`FaceSet`].
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a block to its neighbour across this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The face on the other side of the block.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of block faces packed into the low six bits of a byte.
///
/// The mesh builder receives one `FaceSet` per exposed block, so the set is kept `Copy`
/// and allocation free.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    const ALL_BITS: u8 = 0b0011_1111;

    /// The empty set: a block fully enclosed by neighbours.
    pub fn empty() -> Self {
        FaceSet(0)
    }

    /// All six faces: a block without any neighbour.
    pub fn all() -> Self {
        FaceSet(Self::ALL_BITS)
    }

    /// Adds `side` to the set.
    pub fn insert(&mut self, side: BlockSide) {
        self.0 |= side.bit();
    }

    /// Removes `side` from the set.
    pub fn remove(&mut self, side: BlockSide) {
        self.0 &= !side.bit();
    }

    /// Returns `true` if `side` is in the set.
    pub fn contains(&self, side: BlockSide) -> bool {
        self.0 & side.bit() != 0
    }

    /// Returns `true` if no face is in the set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of faces in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the faces in the set in [`BlockSide`] discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = BlockSide> + '_ {
        (0..6u8)
            .filter(move |index| self.0 & (1 << index) != 0)
            .filter_map(num::FromPrimitive::from_u8)
    }
}

impl FromIterator<BlockSide> for FaceSet {
    fn from_iter<I: IntoIterator<Item = BlockSide>>(iter: I) -> Self {
        let mut set = FaceSet::empty();
        for side in iter {
            set.insert(side);
        }
        set
    }
}

impl fmt::Debug for FaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
