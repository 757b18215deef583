//! # Engine State Module
//!
//! The core engine module that ties the voxel world, the player and the streaming
//! worker together.
//!
//! ## Key Components
//!
//! * `EngineState` - The per-frame driver and main state container
//! * `physics` - Gravity, walking, push-out collision and step-up
//! * `player_state` - The player avatar and its hitbox
//! * `task_management` - The chunk streaming worker and mesh builder seam
//! * `timing` - Frame intervals and performance statistics
//! * `voxels` - Blocks, chunks, terrain generation and the world grid
//!
//! ## Frame Flow
//!
//! 1. The frame time is measured (`tick`) or supplied by the caller (`advance`)
//! 2. Physics advances the player under one world read lock
//! 3. If the player entered a new chunk, the neighbourhood difference is queued for
//!    the streaming worker
//! 4. Frame costs are accumulated and reported periodically
//!
//! ## Startup
//!
//! The chunk column under the spawn position is generated synchronously so the player
//! can be placed on the highest solid block. The rest of the neighbourhood is streamed
//! in by the worker, nearest chunks first.

use std::sync::Arc;

use cgmath::Point3;
use log::info;
use web_time::{Duration, Instant};

use crate::{
    config::EngineConfig,
    core::MtResource,
    error::{EngineError, Result},
};
use physics::{PhysicsResolver, TickReport};
use player_state::{Player, ViewOrientation};
use task_management::{task::MeshBuilder, ChunkStreamer};
use timing::{FrameStats, TickInterval};
use voxels::{
    block::Block,
    chunk::ChunkId,
    tasks::chunk_change_task::ChunkChangeTask,
    terrain::TerrainGenerator,
    world::World,
};

pub mod physics;
pub mod player_state;
pub mod task_management;
pub mod timing;
pub mod voxels;

/// The main state container for the engine.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use voxel_world::{ChannelMeshBuilder, EngineConfig, EngineState};
///
/// let (mesh_builder, events) = ChannelMeshBuilder::channel();
/// let mut engine = EngineState::new(EngineConfig::default(), Arc::new(mesh_builder))?;
///
/// engine.on_walk_toggle(true);
/// loop {
///     let eye = engine.tick()?;
///     for event in events.try_iter() {
///         // hand the exposed faces to the renderer
///     }
///     # break;
/// }
/// # Ok::<(), voxel_world::error::EngineError>(())
/// ```
pub struct EngineState {
    /// The shared world grid
    world: MtResource<World>,
    /// Background loader keeping the neighbourhood resident
    streamer: ChunkStreamer,
    /// Terrain source, shared with the streaming worker
    generator: Arc<TerrainGenerator>,
    /// Moves the player
    physics: PhysicsResolver,
    /// The player avatar
    player: Player,
    /// Chunk the resident neighbourhood is centred on
    current_chunk: ChunkId,
    /// Wall-clock frame interval for `tick`
    interval: TickInterval,
    /// Periodic performance report
    stats: FrameStats,
    /// What physics did in the last frame
    last_report: TickReport,
}

impl EngineState {
    /// Validates `config`, loads the spawn column, places the player and starts
    /// streaming its neighbourhood.
    ///
    /// # Errors
    /// - [`EngineError::Config`] for invalid configuration
    /// - [`EngineError::NoSpawnGround`] if the spawn column has no solid block
    /// - [`EngineError::WorkerSpawn`] if the worker thread cannot start
    pub fn new(config: EngineConfig, mesh_builder: Arc<dyn MeshBuilder>) -> Result<Self> {
        config.validate()?;

        let seed = config.resolve_seed();
        info!("Creating world with seed {seed}");
        let generator = Arc::new(TerrainGenerator::new(seed, config.terrain.clone())?);
        let world = MtResource::new(World::new());

        let task = ChunkChangeTask::new(
            world.clone(),
            generator.clone(),
            mesh_builder,
            config.refresh_neighbor_meshes,
        );
        let streamer = ChunkStreamer::new(task, config.shown_chunk_radius)?;

        let column = Block::new(config.spawn_x, 0, config.spawn_z).chunk();
        for y in generator.vertical_chunk_range() {
            streamer.load_blocking(ChunkId::new(column.0.x, y, column.0.z))?;
        }

        let ground = world
            .get()?
            .highest_block_at(config.spawn_x, config.spawn_z)
            .ok_or(EngineError::NoSpawnGround {
                x: config.spawn_x,
                z: config.spawn_z,
            })?;
        let player = Player::standing_on(ground, config.player.clone());
        let current_chunk = player.current_chunk();

        let queued = {
            let world = world.get()?;
            streamer.fill_neighborhood(current_chunk, &world)?
        };
        info!("Player spawned on {ground} in {current_chunk}, {queued} chunk requests queued");

        Ok(EngineState {
            world,
            streamer,
            generator,
            physics: PhysicsResolver::new(config.physics.clone()),
            player,
            current_chunk,
            interval: TickInterval::new(),
            stats: FrameStats::new(config.stats_interval()?),
            last_report: TickReport::default(),
        })
    }

    /// Advances the simulation by a frame of `dt` seconds and returns the new eye
    /// position.
    ///
    /// `None` or a non-positive `dt` skips physics (first frame).
    ///
    /// # Errors
    /// The streaming worker failure, if the worker stopped.
    pub fn advance(&mut self, dt: Option<f32>) -> Result<Point3<f32>> {
        self.streamer.check_health()?;

        let physics_start = Instant::now();
        self.last_report = {
            let world = self.world.get()?;
            self.physics.advance(&mut self.player, dt, &world)
        };
        let physics_time = physics_start.elapsed();

        let streaming_start = Instant::now();
        let chunk = self.player.current_chunk();
        if chunk != self.current_chunk {
            self.streamer
                .on_player_chunk_changed(self.current_chunk, chunk)?;
            self.current_chunk = chunk;
        }
        let streaming_time = streaming_start.elapsed();

        if let Some(report) = self.stats.record(Instant::now(), physics_time, streaming_time) {
            info!(
                "{report}, {} chunks resident, {} requests pending",
                self.world.get()?.chunk_count(),
                self.streamer.pending()
            );
        }

        Ok(self.player.eye())
    }

    /// Advances the simulation by the wall-clock time since the previous call.
    pub fn tick(&mut self) -> Result<Point3<f32>> {
        let dt = self.interval.tick();
        self.advance(dt)
    }

    /// Rotates the view by a drag of `(dx, dy)`.
    pub fn on_drag(&mut self, dx: f32, dy: f32) {
        self.player.rotate(dx, dy);
    }

    /// Starts or stops walking.
    pub fn on_walk_toggle(&mut self, walking: bool) {
        self.player.set_walking(walking);
    }

    /// Yaw, pitch and eye position for the renderer.
    pub fn player_view_orientation(&self) -> ViewOrientation {
        self.player.orientation()
    }

    /// The player avatar.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The shared world grid.
    pub fn world(&self) -> &MtResource<World> {
        &self.world
    }

    /// The streaming engine.
    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    /// Chunk the resident neighbourhood is centred on.
    pub fn current_chunk(&self) -> ChunkId {
        self.current_chunk
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.generator.seed()
    }

    /// What physics did in the last frame.
    pub fn last_tick_report(&self) -> TickReport {
        self.last_report
    }

    /// Blocks until the streaming worker has applied every queued request.
    ///
    /// Returns `Ok(false)` if `timeout` elapsed first.
    pub fn wait_for_streaming(&self, timeout: Duration) -> Result<bool> {
        self.streamer.wait_until_idle(timeout)
    }
}
