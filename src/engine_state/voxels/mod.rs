//! # Voxel World
//!
//! Representation and generation of the block world.
//!
//! ## Architecture
//!
//! * **Block**: Unit cubes addressed by integer centre coordinates, and the six faces
//!   a block can expose
//! * **Chunk**: 16×16×16 groups of blocks, the unit of loading and unloading
//! * **World**: The set of solid blocks of every resident chunk
//! * **Terrain**: The deterministic, seeded generator producing a chunk's blocks
//! * **Tasks**: Applies streaming requests to the world
//!
//! ## Data Flow
//!
//! 1. The streamer asks for a chunk to be loaded
//! 2. The terrain generator produces its solid blocks
//! 3. The world registers them; exposed faces are derived from the resident blocks
//! 4. The mesh builder is told which blocks of the chunk have visible faces
//!
//! Chunks that are not resident read as air.

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod terrain;
pub mod world;
