#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! An infinite, procedurally generated block world with a walking player.
//!
//! The crate generates terrain chunk by chunk from a seeded noise pipeline, keeps the
//! chunks around the player resident through a background streaming worker, and moves
//! the player through the world with gravity, push-out collision and automatic
//! step-up. Rendering is left to the caller: the streaming engine reports, per chunk,
//! which blocks have visible faces through the [`MeshBuilder`] trait.
//!
//! ## Key Modules
//!
//! * `config` - Serde-backed engine configuration
//! * `core` - The shared, lock-protected resource type used across threads
//! * `engine_state` - Voxels, terrain, streaming, player and physics
//! * `error` - Error types for every layer
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(error) = voxel_world::run() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```
//!
//! ## Threads
//!
//! The simulation runs on the caller's thread. Chunk generation and world mutation
//! happen on one streaming worker; the two share the world through a read-write lock.

use std::sync::Arc;
use std::thread;

use log::{info, warn};
use web_time::{Duration, Instant};

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::EngineConfig;
pub use engine_state::{
    physics::{PhysicsParams, PhysicsResolver, TickReport},
    player_state::{hitbox::Hitbox, Player, PlayerParams, ViewOrientation},
    task_management::{
        task::{ChannelMeshBuilder, ChunkChange, MeshBuilder, MeshEvent},
        ChunkStreamer,
    },
    timing::{FrameReport, FrameStats, TickInterval},
    voxels::{
        block::{
            block_side::{BlockSide, FaceSet},
            Block, ExposedBlock,
        },
        chunk::{neighboring_chunks, ChunkDiff, ChunkId},
        tasks::chunk_change_task::ChunkChangeTask,
        terrain::{TerrainGenerator, TerrainParams},
        world::World,
    },
    EngineState,
};
use error::Result;

/// Frames simulated by [`run`].
const DEMO_FRAMES: u32 = 60 * 30;
/// Target frame time of [`run`].
const DEMO_FRAME_TIME: Duration = Duration::from_micros(16_667);
/// Frames between two turns of the demo walker.
const DEMO_TURN_EVERY: u32 = 60 * 4;

/// Initializes `env_logger` writing to stdout, filtered by `RUST_LOG`.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG");
    // tests and embedders may have installed a logger already
    let _ = log_builder.try_init();
}

/// Runs a headless walk through a freshly generated world.
///
/// The config is read from the file named by `VOXEL_WORLD_CONFIG`, defaults otherwise.
/// The player walks forward for 30 seconds of simulated time, turning every few
/// seconds, while the streaming engine keeps its neighbourhood resident. Mesh events
/// are drained every frame the way a renderer would.
pub fn run() -> Result<()> {
    init_logger();
    info!("Logger initialized");

    let config = EngineConfig::from_env()?;
    let (mesh_builder, events) = ChannelMeshBuilder::channel();
    let mut engine = EngineState::new(config, Arc::new(mesh_builder))?;

    let mut meshed_chunks = 0usize;
    let mut visible_blocks = 0usize;
    let mut jumps = 0u32;

    engine.on_walk_toggle(true);
    for frame in 0..DEMO_FRAMES {
        let frame_start = Instant::now();

        if frame > 0 && frame % DEMO_TURN_EVERY == 0 {
            engine.on_drag(450.0, 0.0);
        }
        engine.tick()?;
        if engine.last_tick_report().jumped {
            jumps += 1;
        }

        for event in events.try_iter() {
            match event {
                MeshEvent::Loaded(_, blocks) => {
                    meshed_chunks += 1;
                    visible_blocks += blocks.len();
                }
                MeshEvent::Unloaded(_) => meshed_chunks = meshed_chunks.saturating_sub(1),
            }
        }

        if let Some(rest) = DEMO_FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    if !engine.wait_for_streaming(Duration::from_secs(10))? {
        warn!("{} streaming requests still pending", engine.streamer().pending());
    }

    let world = engine.world().get()?;
    info!(
        "Walked to {:?} in {}, {} chunks and {} blocks resident, {} step-ups, \
         {meshed_chunks} chunk meshes with {visible_blocks} visible blocks published",
        engine.player().eye(),
        engine.current_chunk(),
        world.chunk_count(),
        world.block_count(),
        jumps,
    );
    Ok(())
}
