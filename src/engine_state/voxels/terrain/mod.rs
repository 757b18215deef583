//! # Terrain Generation
//!
//! Turns a chunk id into the list of solid blocks inside that chunk.
//!
//! ## Algorithm
//!
//! 1. The terrain density field ([`TerrainNoise`]) is sampled on a coarse lattice over
//!    the chunk and interpolated for every other block ([`NoiseLattice`]).
//! 2. Each block is solid when the noise value outweighs a height bias that grows
//!    linearly with `y`:
//!
//! ```text
//! solid  <=>  noise - (y - min - h) / h >= 0,   h = (max - min) / 2
//! ```
//!
//! Below `min` every block is solid, above `max` no block is (the noise is clamped to
//! `[-1, 1]`). Chunks whose whole y range lies outside the elevation band are skipped
//! entirely and yield no blocks.
//!
//! Generation is a pure function of the chunk id and the world seed, so the same chunk
//! is rebuilt identically after it was unloaded.

pub mod lattice;
pub mod noise_pipeline;

use std::ops::RangeInclusive;

use serde::Deserialize;

use super::block::Block;
use super::chunk::{ChunkId, CHUNK_DIMENSION};
use crate::error::{positive, ConfigError};
use lattice::NoiseLattice;
use noise_pipeline::{NoiseParams, TerrainNoise};

/// Parameters of the terrain generator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Lowest surface elevation; every block below it is solid.
    pub min_elevation: i32,
    /// Highest surface elevation; no block above it is solid.
    pub max_elevation: i32,
    /// Distance in blocks between two noise samples along each axis.
    pub sampling_rate: i32,
    /// The density field.
    pub noise: NoiseParams,
}

impl Default for TerrainParams {
    fn default() -> Self {
        TerrainParams {
            min_elevation: 46,
            max_elevation: 100,
            sampling_rate: 4,
            noise: NoiseParams::default(),
        }
    }
}

impl TerrainParams {
    /// Checks the elevation band, the sampling rate and the noise parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_elevation >= self.max_elevation {
            return Err(ConfigError::EmptyRange {
                name: "elevation",
                min: self.min_elevation as f64,
                max: self.max_elevation as f64,
            });
        }
        positive("sampling rate", self.sampling_rate as f64)?;
        if CHUNK_DIMENSION % self.sampling_rate != 0 {
            return Err(ConfigError::SamplingRate {
                chunk_dimension: CHUNK_DIMENSION,
                sampling_rate: self.sampling_rate,
            });
        }
        self.noise.validate()
    }

    /// Half the height of the elevation band.
    fn half_height(&self) -> f32 {
        0.5 * (self.max_elevation - self.min_elevation) as f32
    }
}

/// Deterministic chunk generator for one world seed.
///
/// # Examples
///
/// ```
/// use voxel_world::{ChunkId, TerrainGenerator, TerrainParams};
///
/// let generator = TerrainGenerator::new(7, TerrainParams::default()).unwrap();
/// // far above the elevation band
/// assert!(generator.generate_chunk(ChunkId::new(0, 20, 0)).is_empty());
/// // the band itself contains terrain
/// assert!(!generator.generate_chunk(ChunkId::new(0, 2, 0)).is_empty());
/// ```
pub struct TerrainGenerator {
    seed: u32,
    params: TerrainParams,
    noise: TerrainNoise,
}

impl TerrainGenerator {
    /// Validates `params` and builds the noise sources for `seed`.
    pub fn new(seed: u32, params: TerrainParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let noise = TerrainNoise::new(&params.noise, seed);
        Ok(TerrainGenerator {
            seed,
            params,
            noise,
        })
    }

    /// The world seed this generator was built for.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Chunk y indices that can contain solid blocks.
    pub fn vertical_chunk_range(&self) -> RangeInclusive<i32> {
        self.params.min_elevation.div_euclid(CHUNK_DIMENSION)
            ..=self.params.max_elevation.div_euclid(CHUNK_DIMENSION)
    }

    /// Returns the solid blocks of `chunk`, ordered by x, then y, then z.
    pub fn generate_chunk(&self, chunk: ChunkId) -> Vec<Block> {
        if !self.vertical_chunk_range().contains(&chunk.0.y) {
            return Vec::new();
        }

        let origin = chunk.origin();
        let dimension = CHUNK_DIMENSION as usize;
        let lattice = NoiseLattice::sample(
            &self.noise,
            origin,
            dimension,
            self.params.sampling_rate as usize,
        );

        let min = self.params.min_elevation as f32;
        let h = self.params.half_height();

        let mut blocks = Vec::new();
        for x in 0..dimension {
            for y in 0..dimension {
                let world_y = origin.0.y + y as i32;
                let bias = (world_y as f32 - min - h) / h;
                for z in 0..dimension {
                    if lattice.get(x, y, z) - bias >= 0.0 {
                        blocks.push(Block::new(
                            origin.0.x + x as i32,
                            world_y,
                            origin.0.z + z as i32,
                        ));
                    }
                }
            }
        }
        blocks
    }
}
