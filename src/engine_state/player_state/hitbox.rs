//! Axis-aligned player hitbox and the sample points used for collision queries.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

/// An axis-aligned bounding box in world space.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Hitbox {
    /// Corner with the smallest coordinates
    pub min: Point3<f32>,
    /// Corner with the largest coordinates
    pub max: Point3<f32>,
}

impl Hitbox {
    /// Creates a hitbox from its two extreme corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Hitbox { min, max }
    }

    /// Centre of the box.
    pub fn mid(&self) -> Point3<f32> {
        Point3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    /// Blocks containing the 8 corners, deduplicated and ordered by `(y, x, z)`.
    pub fn corner_blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(8);
        for y in [self.min.y, self.max.y] {
            blocks.extend(self.horizontal_corner_blocks(y));
        }
        dedup_sorted(blocks)
    }

    /// Blocks containing the 4 horizontal corners at mid height.
    pub fn knee_blocks(&self) -> Vec<Block> {
        let knee = 0.5 * (self.min.y + self.max.y);
        dedup_sorted(self.horizontal_corner_blocks(knee).to_vec())
    }

    /// Blocks containing the 4 horizontal corners of the top face.
    pub fn head_blocks(&self) -> Vec<Block> {
        dedup_sorted(self.horizontal_corner_blocks(self.max.y).to_vec())
    }

    fn horizontal_corner_blocks(&self, y: f32) -> [Block; 4] {
        [
            Block::containing(Point3::new(self.min.x, y, self.min.z)),
            Block::containing(Point3::new(self.max.x, y, self.min.z)),
            Block::containing(Point3::new(self.min.x, y, self.max.z)),
            Block::containing(Point3::new(self.max.x, y, self.max.z)),
        ]
    }
}

fn dedup_sorted(mut blocks: Vec<Block>) -> Vec<Block> {
    blocks.sort_by_key(Block::sort_key);
    blocks.dedup();
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_inside_one_block_collapse() {
        let hitbox = Hitbox::new(Point3::new(-0.3, -0.4, -0.3), Point3::new(0.3, 0.4, 0.3));
        assert_eq!(hitbox.corner_blocks(), vec![Block::new(0, 0, 0)]);
        assert_eq!(hitbox.mid(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn corners_are_sorted_by_height_first() {
        let hitbox = Hitbox::new(Point3::new(0.2, 0.6, 0.0), Point3::new(0.8, 2.4, 0.4));
        let blocks = hitbox.corner_blocks();
        assert_eq!(
            blocks,
            vec![
                Block::new(0, 1, 0),
                Block::new(1, 1, 0),
                Block::new(0, 2, 0),
                Block::new(1, 2, 0),
            ]
        );
        assert_eq!(hitbox.knee_blocks(), vec![Block::new(0, 2, 0), Block::new(1, 2, 0)]);
        assert_eq!(hitbox.head_blocks(), vec![Block::new(0, 2, 0), Block::new(1, 2, 0)]);
    }
}
