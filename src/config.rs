//! # Engine Configuration
//!
//! All tunables of the engine in one serde-deserializable structure. Every field has a
//! default, so a config file only has to name the values it changes:
//!
//! ```json
//! {
//!     "seed": 1234,
//!     "shown_chunk_radius": 4,
//!     "physics": { "walking_speed": 5.0 }
//! }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;
use web_time::Duration;

use crate::engine_state::{
    physics::PhysicsParams, player_state::PlayerParams, voxels::terrain::TerrainParams,
};
use crate::error::{positive, ConfigError};

/// Environment variable naming the config file read by the demo binary.
pub const CONFIG_ENV_VAR: &str = "VOXEL_WORLD_CONFIG";

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World seed; a random seed is drawn when absent.
    pub seed: Option<u32>,
    /// Block x coordinate of the spawn column.
    pub spawn_x: i32,
    /// Block z coordinate of the spawn column.
    pub spawn_z: i32,
    /// Euclidean radius, in chunks, of the resident neighbourhood.
    pub shown_chunk_radius: i32,
    /// Re-publish the face-adjacent chunks after every load and unload.
    pub refresh_neighbor_meshes: bool,
    /// Seconds between two performance reports.
    pub stats_interval_secs: f32,
    /// Terrain generator parameters.
    pub terrain: TerrainParams,
    /// Movement constants.
    pub physics: PhysicsParams,
    /// Player body dimensions.
    pub player: PlayerParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: None,
            spawn_x: 0,
            spawn_z: 0,
            shown_chunk_radius: 3,
            refresh_neighbor_meshes: true,
            stats_interval_secs: 5.0,
            terrain: TerrainParams::default(),
            physics: PhysicsParams::default(),
            player: PlayerParams::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("shown chunk radius", self.shown_chunk_radius as f64)?;
        positive("stats interval", self.stats_interval_secs as f64)?;
        self.stats_interval()?;
        self.terrain.validate()?;
        self.physics.validate()?;
        self.player.validate()
    }

    /// Time between two performance reports.
    ///
    /// Fails for intervals a [`Duration`] cannot hold.
    pub fn stats_interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f32(self.stats_interval_secs).map_err(|_| ConfigError::OutOfRange {
            name: "stats interval",
            value: self.stats_interval_secs as f64,
        })
    }

    /// The configured seed, or a random one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }
}
