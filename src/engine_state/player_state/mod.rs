//! # Player State Management
//!
//! This module tracks the player avatar:
//! - Eye position, which is the point the physics resolver moves
//! - Vertical speed and the walking flag
//! - View rotation (yaw and pitch in degrees) driven by drag input
//!
//! ## Orientation
//! Yaw rotates in the horizontal plane starting from the negative z axis and is
//! unbounded (periodic in 360). Pitch is the angle above the horizontal plane, clamped
//! to `[-90, 90]`. Walking always moves along the yaw direction, independent of pitch.
//!
//! The hitbox hangs below the eye: its bottom (the feet) is `eye_level` below the eye
//! and its top is `height` above the feet.

pub mod hitbox;

use cgmath::{Angle, Deg, Point3, Vector3};
use serde::Deserialize;

use super::voxels::{block::Block, chunk::ChunkId};
use crate::error::{positive, ConfigError};
use hitbox::Hitbox;

/// Gap between the top of the spawn block and the feet, so the first physics step
/// does not start in contact.
const SPAWN_CLEARANCE: f32 = 0.00001;

/// Player body dimensions and input sensitivity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerParams {
    /// Hitbox extent along x and z.
    pub width: f32,
    /// Hitbox extent along y.
    pub height: f32,
    /// Eye height above the feet.
    pub eye_level: f32,
    /// Degrees of rotation per unit of drag.
    pub drag_sensitivity: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        PlayerParams {
            width: 0.6,
            height: 1.8,
            eye_level: 1.62,
            drag_sensitivity: 0.2,
        }
    }
}

impl PlayerParams {
    /// Checks that every dimension is positive and the eye is inside the hitbox.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("player width", self.width as f64)?;
        positive("player height", self.height as f64)?;
        positive("player eye level", self.eye_level as f64)?;
        positive("drag sensitivity", self.drag_sensitivity as f64)?;
        if self.eye_level > self.height {
            return Err(ConfigError::EmptyRange {
                name: "player eye level",
                min: self.eye_level as f64,
                max: self.height as f64,
            });
        }
        Ok(())
    }
}

/// Where the player looks from and in which direction.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ViewOrientation {
    /// Horizontal rotation in degrees, from the negative z axis
    pub yaw: f32,
    /// Elevation above the horizontal plane in degrees, `[-90, 90]`
    pub pitch: f32,
    /// Eye position in world space
    pub eye: Point3<f32>,
}

impl ViewOrientation {
    /// Unit vector of the viewing direction.
    pub fn look_direction(&self) -> Vector3<f32> {
        let vertical = Deg(self.pitch).cos();
        let heading = Deg(self.yaw - 90.0);
        Vector3::new(
            heading.cos() * vertical,
            Deg(self.pitch).sin(),
            heading.sin() * vertical,
        )
    }
}

/// The player avatar.
#[derive(Clone, Debug)]
pub struct Player {
    eye: Point3<f32>,
    vertical_speed: f32,
    walking: bool,
    yaw: f32,
    pitch: f32,
    params: PlayerParams,
}

impl Player {
    /// Places the player standing on top of `block`, looking along the negative z axis.
    pub fn standing_on(block: Block, params: PlayerParams) -> Self {
        let eye = Point3::new(
            block.0.x as f32,
            block.0.y as f32 + 0.5 + SPAWN_CLEARANCE + params.eye_level,
            block.0.z as f32,
        );
        Player {
            eye,
            vertical_speed: 0.0,
            walking: false,
            yaw: 0.0,
            pitch: 0.0,
            params,
        }
    }

    /// The eye position.
    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub(crate) fn set_eye(&mut self, eye: Point3<f32>) {
        self.eye = eye;
    }

    /// Bottom centre of the hitbox.
    pub fn feet(&self) -> Point3<f32> {
        Point3::new(self.eye.x, self.eye.y - self.params.eye_level, self.eye.z)
    }

    /// Vertical speed in blocks per second, positive upwards.
    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }

    pub(crate) fn set_vertical_speed(&mut self, vertical_speed: f32) {
        self.vertical_speed = vertical_speed;
    }

    /// Whether the player walks forward.
    pub fn walking(&self) -> bool {
        self.walking
    }

    /// Starts or stops walking.
    pub fn set_walking(&mut self, walking: bool) {
        self.walking = walking;
    }

    /// Yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Applies a drag of `(dx, dy)` to the view rotation.
    ///
    /// Dragging right turns left (yaw decreases); pitch is clamped to `[-90, 90]`.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.params.drag_sensitivity;
        self.pitch = (self.pitch + dy * self.params.drag_sensitivity).clamp(-90.0, 90.0);
    }

    /// Unit horizontal walking direction, or zero when not walking.
    pub fn motion_vector(&self) -> Vector3<f32> {
        if !self.walking {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        let heading = Deg(self.yaw - 90.0);
        Vector3::new(heading.cos(), 0.0, heading.sin())
    }

    /// The hitbox of the player if its eye were at `eye`.
    pub fn hitbox_at(&self, eye: Point3<f32>) -> Hitbox {
        let half_width = 0.5 * self.params.width;
        let feet = eye.y - self.params.eye_level;
        Hitbox::new(
            Point3::new(eye.x - half_width, feet, eye.z - half_width),
            Point3::new(
                eye.x + half_width,
                feet + self.params.height,
                eye.z + half_width,
            ),
        )
    }

    /// The current hitbox.
    pub fn hitbox(&self) -> Hitbox {
        self.hitbox_at(self.eye)
    }

    /// The chunk of the block the player stands on; drives chunk streaming.
    ///
    /// This is the block half a unit below the feet, so a player on the top layer of a
    /// chunk still belongs to that chunk.
    pub fn current_chunk(&self) -> ChunkId {
        ChunkId::of_position(self.feet() - Vector3::new(0.0, 0.5, 0.0))
    }

    /// Yaw, pitch and eye position for the renderer.
    pub fn orientation(&self) -> ViewOrientation {
        ViewOrientation {
            yaw: self.yaw,
            pitch: self.pitch,
            eye: self.eye,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn spawns_on_top_of_block() {
        let player = Player::standing_on(Block::new(3, 70, -2), PlayerParams::default());
        assert!(close(player.eye().y, 70.0 + 0.50001 + 1.62));
        assert_eq!(player.eye().x, 3.0);
        assert_eq!(player.eye().z, -2.0);
        assert!(!player.walking());
        assert_eq!(player.vertical_speed(), 0.0);
        assert_eq!(player.current_chunk(), ChunkId::new(0, 4, -1));

        let hitbox = player.hitbox();
        assert!(close(hitbox.min.y, 70.50001));
        assert!(close(hitbox.max.y, 70.50001 + 1.8));
        assert!(close(hitbox.max.x - hitbox.min.x, 0.6));
    }

    #[test]
    fn current_chunk_is_the_chunk_of_the_ground_block() {
        // y = 79 is the top layer of chunk row 4
        let mut player = Player::standing_on(Block::new(5, 79, 5), PlayerParams::default());
        assert_eq!(player.current_chunk(), ChunkId::new(0, 4, 0));

        player.set_eye(Point3::new(5.0, 79.5 + 1.62, 5.0));
        assert_eq!(player.current_chunk(), ChunkId::new(0, 4, 0));

        player.set_eye(Point3::new(5.0, 80.5 + 1.62, 5.0));
        assert_eq!(player.current_chunk(), ChunkId::new(0, 5, 0));
    }

    #[test]
    fn rotation_follows_drag_and_clamps_pitch() {
        let mut player = Player::standing_on(Block::new(0, 0, 0), PlayerParams::default());
        player.rotate(10.0, 5.0);
        assert!(close(player.yaw(), -2.0));
        assert!(close(player.pitch(), 1.0));

        player.rotate(0.0, 1000.0);
        assert_eq!(player.pitch(), 90.0);
        player.rotate(0.0, -5000.0);
        assert_eq!(player.pitch(), -90.0);
    }

    #[test]
    fn motion_vector_follows_yaw() {
        let mut player = Player::standing_on(Block::new(0, 0, 0), PlayerParams::default());
        assert_eq!(player.motion_vector(), Vector3::new(0.0, 0.0, 0.0));

        player.set_walking(true);
        let forward = player.motion_vector();
        assert!(close(forward.x, 0.0) && close(forward.z, -1.0));

        player.rotate(-450.0, 0.0);
        let east = player.motion_vector();
        assert!(close(east.x, 1.0) && close(east.z, 0.0) && east.y == 0.0);
    }

    #[test]
    fn look_direction_matches_walking_direction_when_level() {
        let mut player = Player::standing_on(Block::new(0, 0, 0), PlayerParams::default());
        player.set_walking(true);
        player.rotate(123.0, 0.0);
        let look = player.orientation().look_direction();
        let walk = player.motion_vector();
        assert!(close(look.x, walk.x) && close(look.z, walk.z) && close(look.y, 0.0));

        player.rotate(0.0, 450.0);
        let up = player.orientation().look_direction();
        assert!(close(up.y, 1.0));
    }

    #[test]
    fn params_are_validated() {
        assert!(PlayerParams::default().validate().is_ok());
        let params = PlayerParams {
            eye_level: 2.0,
            ..PlayerParams::default()
        };
        assert!(params.validate().is_err());
        let params = PlayerParams {
            width: 0.0,
            ..PlayerParams::default()
        };
        assert!(matches!(params.validate(), Err(ConfigError::NonPositive { .. })));
    }
}
