//! # Physics Resolver
//!
//! Moves the player through the world once per frame:
//!
//! 1. Gravity accelerates the player downwards up to terminal velocity
//! 2. Walking moves the player horizontally along the yaw direction
//! 3. Solid blocks at the hitbox corners push the tentative position out
//! 4. Landing on or bumping into a block stops vertical motion
//! 5. A step at knee height with free head room triggers an automatic jump
//!
//! Long frames are split into sub-steps so a fast-falling player cannot tunnel
//! through the floor. Very long frames (e.g. after the process was suspended) are
//! clamped instead of simulated in full.

pub mod collision;

use cgmath::Vector3;
use log::warn;
use serde::Deserialize;

use super::player_state::Player;
use super::voxels::world::World;
use crate::error::{positive, ConfigError};

/// Physical constants of the player's movement, in blocks and seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Horizontal speed while walking.
    pub walking_speed: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Highest falling speed.
    pub terminal_velocity: f32,
    /// Height reached by an automatic step-up jump.
    pub max_jump_height: f32,
    /// Longest simulated sub-step.
    pub max_step_dt: f32,
    /// Sub-steps per frame when the frame is short enough.
    pub sub_steps: u32,
    /// Upper bound on sub-steps; longer frames are clamped.
    pub max_sub_steps: u32,
    /// Minimum overlap on the other two axes for a push-out to happen.
    pub overlap_threshold: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams {
            walking_speed: 4.317,
            gravity: 32.0,
            terminal_velocity: 78.4,
            max_jump_height: 1.252,
            max_step_dt: 0.05,
            sub_steps: 5,
            max_sub_steps: 50,
            overlap_threshold: 0.25,
        }
    }
}

impl PhysicsParams {
    /// Checks that every constant is positive and the sub-step bounds are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("walking speed", self.walking_speed as f64)?;
        positive("gravity", self.gravity as f64)?;
        positive("terminal velocity", self.terminal_velocity as f64)?;
        positive("max jump height", self.max_jump_height as f64)?;
        positive("max step dt", self.max_step_dt as f64)?;
        positive("sub steps", self.sub_steps as f64)?;
        positive("overlap threshold", self.overlap_threshold as f64)?;
        if self.max_sub_steps < self.sub_steps {
            return Err(ConfigError::EmptyRange {
                name: "sub steps",
                min: self.sub_steps as f64,
                max: self.max_sub_steps as f64,
            });
        }
        Ok(())
    }

    /// Initial vertical speed of a jump reaching `max_jump_height`.
    pub fn jump_speed(&self) -> f32 {
        (2.0 * self.gravity * self.max_jump_height).sqrt()
    }
}

/// What happened during one frame, for diagnostics and tests.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct TickReport {
    /// Sub-steps simulated; 0 when the frame was skipped
    pub sub_steps: u32,
    /// The player was pushed up out of a block
    pub ground_contact: bool,
    /// The player was pushed down out of a block
    pub ceiling_contact: bool,
    /// An automatic step-up jump started
    pub jumped: bool,
}

/// Advances the player through a world snapshot.
#[derive(Clone, Debug)]
pub struct PhysicsResolver {
    params: PhysicsParams,
    jump_speed: f32,
}

impl PhysicsResolver {
    /// Creates a resolver; `params` must already be validated.
    pub fn new(params: PhysicsParams) -> Self {
        let jump_speed = params.jump_speed();
        PhysicsResolver { params, jump_speed }
    }

    /// The resolver's constants.
    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Splits a frame into `(steps, step_dt)`.
    ///
    /// Uses `sub_steps` steps, more when a step would exceed `max_step_dt`, and at most
    /// `max_sub_steps` steps of `max_step_dt`, dropping the rest of the frame.
    pub fn split_frame(&self, dt: f32) -> (u32, f32) {
        let needed = (dt / self.params.max_step_dt).ceil() as u32;
        let steps = needed.max(self.params.sub_steps);
        if steps > self.params.max_sub_steps {
            let simulated = self.params.max_sub_steps as f32 * self.params.max_step_dt;
            warn!("Frame time of {dt:.3}s clamped to {simulated:.3}s");
            return (self.params.max_sub_steps, self.params.max_step_dt);
        }
        (steps, dt / steps as f32)
    }

    /// Advances `player` by a frame of `dt` seconds.
    ///
    /// A missing (first frame) or non-positive `dt` leaves the player untouched.
    pub fn advance(&self, player: &mut Player, dt: Option<f32>, world: &World) -> TickReport {
        let Some(dt) = dt.filter(|dt| *dt > 0.0) else {
            return TickReport::default();
        };

        let (steps, step_dt) = self.split_frame(dt);
        let mut report = TickReport {
            sub_steps: steps,
            ..TickReport::default()
        };
        for _ in 0..steps {
            self.step(player, step_dt, world, &mut report);
        }
        report
    }

    fn step(&self, player: &mut Player, dt: f32, world: &World, report: &mut TickReport) {
        let mut vertical_speed =
            (player.vertical_speed() - dt * self.params.gravity).max(-self.params.terminal_velocity);

        let tentative = player.eye()
            + player.motion_vector() * (dt * self.params.walking_speed)
            + Vector3::new(0.0, dt * vertical_speed, 0.0);

        let resolution = collision::resolve(player, tentative, world, self.params.overlap_threshold);
        player.set_eye(resolution.eye);
        report.ground_contact |= resolution.ground_contact;
        report.ceiling_contact |= resolution.ceiling_contact;

        if resolution.stop_vertical() {
            vertical_speed = 0.0;
        }
        // the step test uses the position before push-out, where the knees are in the step
        if vertical_speed == 0.0 && collision::should_step_up(player, tentative, world) {
            vertical_speed = self.jump_speed;
            report.jumped = true;
        }
        player.set_vertical_speed(vertical_speed);
    }
}
