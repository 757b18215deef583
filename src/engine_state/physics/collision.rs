//! Push-out collision between the player hitbox and solid blocks.
//!
//! Every solid block found at a hitbox corner pushes the hitbox out along the axis of
//! least overlap. A push only happens when the hitbox overlaps the block by at least
//! the overlap threshold on the two other axes, so grazing a block edge never shoves
//! the player sideways into the neighbouring block.

use cgmath::{Point3, Vector3};
use log::trace;

use crate::engine_state::{
    player_state::{hitbox::Hitbox, Player},
    voxels::{block::Block, world::World},
};

/// Axis along which a block pushed the hitbox.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A single push-out.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Push {
    /// Push direction
    pub axis: Axis,
    /// Signed distance along `axis`
    pub distance: f32,
}

impl Push {
    fn offset(&self) -> Vector3<f32> {
        match self.axis {
            Axis::X => Vector3::new(self.distance, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, self.distance, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, self.distance),
        }
    }
}

/// Overlap of `[min, max]` with the block cube `[center - 0.5, center + 0.5]`, at least 0.
fn overlap(center: f32, min: f32, max: f32) -> f32 {
    ((center + 0.5).min(max) - (center - 0.5).max(min)).max(0.0)
}

/// Distance that moves `[min, max]` out of the block cube, away from its centre.
fn separation(center: f32, min: f32, max: f32) -> f32 {
    if 0.5 * (min + max) < center {
        -(max - (center - 0.5))
    } else {
        (center + 0.5) - min
    }
}

/// Computes the push that separates `hitbox` from `block`, if any.
pub fn push_out(hitbox: &Hitbox, block: Block, overlap_threshold: f32) -> Option<Push> {
    let center = block.center();
    let x = overlap(center.x, hitbox.min.x, hitbox.max.x);
    let y = overlap(center.y, hitbox.min.y, hitbox.max.y);
    let z = overlap(center.z, hitbox.min.z, hitbox.max.z);

    let (axis, smallest, others) = if x <= y && x <= z {
        (Axis::X, x, [y, z])
    } else if y <= x && y <= z {
        (Axis::Y, y, [x, z])
    } else {
        (Axis::Z, z, [x, y])
    };

    if smallest <= 0.0 || others.iter().any(|other| *other < overlap_threshold) {
        return None;
    }

    let distance = match axis {
        Axis::X => separation(center.x, hitbox.min.x, hitbox.max.x),
        Axis::Y => separation(center.y, hitbox.min.y, hitbox.max.y),
        Axis::Z => separation(center.z, hitbox.min.z, hitbox.max.z),
    };
    Some(Push { axis, distance })
}

/// Outcome of resolving one tentative position.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Resolution {
    /// The eye position after all pushes
    pub eye: Point3<f32>,
    /// A block pushed the hitbox up
    pub ground_contact: bool,
    /// A block pushed the hitbox down
    pub ceiling_contact: bool,
}

impl Resolution {
    /// Whether vertical motion must stop.
    pub fn stop_vertical(&self) -> bool {
        self.ground_contact || self.ceiling_contact
    }
}

/// Pushes the player's hitbox at `eye` out of every solid block at its corners.
///
/// Blocks are handled in `(y, x, z)` order and every push moves the hitbox before the
/// next block is looked at. A player wedged between blocks may stay partly inside.
pub fn resolve(player: &Player, eye: Point3<f32>, world: &World, overlap_threshold: f32) -> Resolution {
    let mut resolution = Resolution {
        eye,
        ground_contact: false,
        ceiling_contact: false,
    };

    let colliding: Vec<Block> = player
        .hitbox_at(eye)
        .corner_blocks()
        .into_iter()
        .filter(|block| world.contains(block))
        .collect();

    for block in colliding {
        let hitbox = player.hitbox_at(resolution.eye);
        let Some(push) = push_out(&hitbox, block, overlap_threshold) else {
            continue;
        };
        trace!("Pushed out of {block} along {:?} by {}", push.axis, push.distance);
        resolution.eye += push.offset();
        if push.axis == Axis::Y {
            if push.distance > 0.0 {
                resolution.ground_contact = true;
            } else {
                resolution.ceiling_contact = true;
            }
        }
    }

    resolution
}

/// The knees hit a solid block while the head is clear: a step the player can climb.
pub fn should_step_up(player: &Player, eye: Point3<f32>, world: &World) -> bool {
    let hitbox = player.hitbox_at(eye);
    world.intersects(&hitbox.knee_blocks()) && !world.intersects(&hitbox.head_blocks())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hitbox(min: [f32; 3], max: [f32; 3]) -> Hitbox {
        Hitbox::new(Point3::from(min), Point3::from(max))
    }

    #[test]
    fn pushes_along_smallest_overlap() {
        // feet sunk 0.1 into the block below
        let push = push_out(&hitbox([-0.3, 0.4, -0.3], [0.3, 2.2, 0.3]), Block::new(0, 0, 0), 0.25)
            .unwrap();
        assert_eq!(push.axis, Axis::Y);
        assert!((push.distance - 0.1).abs() < 1e-6);

        // walked 0.05 into a wall on the +x side
        let push = push_out(&hitbox([0.95, 0.5, -0.3], [1.55, 2.3, 0.3]), Block::new(2, 1, 0), 0.25)
            .unwrap();
        assert_eq!(push.axis, Axis::X);
        assert!((push.distance + 0.05).abs() < 1e-6);

        // walked into a wall on the -z side
        let push = push_out(&hitbox([-0.3, 0.5, -0.6], [0.3, 2.3, 0.0]), Block::new(0, 1, -1), 0.25)
            .unwrap();
        assert_eq!(push.axis, Axis::Z);
        assert!((push.distance - 0.1).abs() < 1e-6);
    }

    #[test]
    fn grazing_a_block_edge_does_not_push() {
        // overlaps the block by only 0.1 along z
        let grazing = hitbox([0.95, 0.5, 0.4], [1.55, 2.3, 1.0]);
        assert_eq!(push_out(&grazing, Block::new(2, 1, 0), 0.25), None);
    }

    #[test]
    fn touching_is_not_overlapping() {
        let touching = hitbox([-0.3, 0.5, -0.3], [0.3, 2.3, 0.3]);
        assert_eq!(push_out(&touching, Block::new(0, 0, 0), 0.25), None);
    }
}
