//! Error types for the voxel world

use thiserror::Error;

use crate::core::PoisonedResource;
use crate::engine_state::voxels::{block::Block, chunk::ChunkId};

/// Invalid configuration. Raised while building the engine and never recovered from.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("chunk dimension {chunk_dimension} is not divisible by sampling rate {sampling_rate}")]
    SamplingRate {
        chunk_dimension: i32,
        sampling_rate: i32,
    },

    #[error("{name} of {value} is out of range")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("{name} range is empty: {min} >= {max}")]
    EmptyRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejects zero, negative and NaN values of the parameter `name`.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

/// Violations of the world grid invariants.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("{0} is already resident")]
    ChunkAlreadyResident(ChunkId),

    #[error("{0} is not resident")]
    ChunkNotResident(ChunkId),

    #[error("{block} does not belong to {chunk}")]
    BlockOutsideChunk { block: Block, chunk: ChunkId },

    #[error("{0} is listed more than once")]
    DuplicateBlock(Block),

    #[error(transparent)]
    Poisoned(#[from] PoisonedResource),
}

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("world error: {0}")]
    World(#[from] WorldError),

    #[error("streaming worker failed: {0}")]
    WorkerFailed(String),

    #[error("streaming worker is no longer running")]
    WorkerDisconnected,

    #[error("failed to start streaming worker: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("no solid block below spawn column ({x}, {z})")]
    NoSpawnGround { x: i32, z: i32 },
}

impl From<PoisonedResource> for EngineError {
    fn from(error: PoisonedResource) -> Self {
        EngineError::World(WorldError::Poisoned(error))
    }
}

/// Convenience alias used across the engine.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
