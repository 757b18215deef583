//! # Chunk Change Task
//!
//! This module defines the `ChunkChangeTask`, which applies one `ChunkChange` to the
//! shared world and reports the resulting geometry changes to the mesh builder.
//!
//! A load or unload changes the exposure of the blocks on the boundary of every
//! face-adjacent chunk, so those neighbours get a fresh `chunk_loaded` as well when
//! neighbour refresh is enabled.

use std::sync::Arc;

use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::{ChunkChange, MeshBuilder},
        voxels::{
            block::ExposedBlock,
            chunk::ChunkId,
            terrain::TerrainGenerator,
            world::World,
        },
    },
    error::WorldError,
};

/// Everything the streaming worker needs to apply a chunk change.
///
/// Cloning is cheap; every field is a shared handle.
#[derive(Clone)]
pub struct ChunkChangeTask {
    /// The shared world grid
    world: MtResource<World>,
    /// Terrain source for newly loaded chunks
    generator: Arc<TerrainGenerator>,
    /// Receiver of the exposed face sets
    mesh_builder: Arc<dyn MeshBuilder>,
    /// Whether neighbours of a changed chunk are re-published
    refresh_neighbor_meshes: bool,
}

impl ChunkChangeTask {
    /// Creates a new chunk change task.
    pub fn new(
        world: MtResource<World>,
        generator: Arc<TerrainGenerator>,
        mesh_builder: Arc<dyn MeshBuilder>,
        refresh_neighbor_meshes: bool,
    ) -> Self {
        ChunkChangeTask {
            world,
            generator,
            mesh_builder,
            refresh_neighbor_meshes,
        }
    }

    /// Applies `change` to the world and notifies the mesh builder.
    ///
    /// # Errors
    /// Any [`WorldError`]: loading a resident chunk, unloading a chunk that is not
    /// resident, or a poisoned world lock. The world is unchanged in the first two cases.
    pub fn process(&self, change: ChunkChange) -> Result<(), WorldError> {
        match change {
            ChunkChange::Load(chunk) => self.load(chunk),
            ChunkChange::Unload(chunk) => self.unload(chunk),
        }
    }

    fn load(&self, chunk: ChunkId) -> Result<(), WorldError> {
        let blocks = self.generator.generate_chunk(chunk);
        let block_count = blocks.len();

        let (exposed, neighbors) = {
            let mut world = self.world.get_mut()?;
            world.add_chunk(chunk, blocks)?;
            let exposed = world.exposed_blocks(chunk);
            (exposed, self.neighbor_meshes(&world, chunk))
        };

        debug!(
            "Loaded {chunk}: {block_count} blocks, {} exposed",
            exposed.len()
        );
        self.mesh_builder.chunk_loaded(chunk, exposed);
        self.publish_neighbors(neighbors);
        Ok(())
    }

    fn unload(&self, chunk: ChunkId) -> Result<(), WorldError> {
        let (removed, neighbors) = {
            let mut world = self.world.get_mut()?;
            let removed = world.remove_chunk(chunk)?;
            (removed.len(), self.neighbor_meshes(&world, chunk))
        };

        debug!("Unloaded {chunk}: {removed} blocks");
        self.mesh_builder.chunk_unloaded(chunk);
        self.publish_neighbors(neighbors);
        Ok(())
    }

    fn neighbor_meshes(&self, world: &World, chunk: ChunkId) -> Vec<(ChunkId, Vec<ExposedBlock>)> {
        if !self.refresh_neighbor_meshes {
            return Vec::new();
        }
        world
            .resident_face_neighbors(chunk)
            .into_iter()
            .map(|neighbor| (neighbor, world.exposed_blocks(neighbor)))
            .collect()
    }

    fn publish_neighbors(&self, neighbors: Vec<(ChunkId, Vec<ExposedBlock>)>) {
        for (neighbor, exposed) in neighbors {
            self.mesh_builder.chunk_loaded(neighbor, exposed);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::engine_state::{
        task_management::task::MeshEvent,
        voxels::{block::Block, terrain::TerrainParams},
    };

    #[derive(Default)]
    struct Recorder(Mutex<Vec<MeshEvent>>);

    impl MeshBuilder for Recorder {
        fn chunk_loaded(&self, chunk: ChunkId, blocks: Vec<ExposedBlock>) {
            self.0.lock().unwrap().push(MeshEvent::Loaded(chunk, blocks));
        }

        fn chunk_unloaded(&self, chunk: ChunkId) {
            self.0.lock().unwrap().push(MeshEvent::Unloaded(chunk));
        }
    }

    fn task(refresh: bool) -> (ChunkChangeTask, MtResource<World>, Arc<Recorder>) {
        let world = MtResource::new(World::new());
        let generator = Arc::new(TerrainGenerator::new(3, TerrainParams::default()).unwrap());
        let recorder = Arc::new(Recorder::default());
        let task = ChunkChangeTask::new(world.clone(), generator, recorder.clone(), refresh);
        (task, world, recorder)
    }

    #[test]
    fn load_registers_generated_blocks() {
        let (task, world, recorder) = task(true);
        let chunk = ChunkId::new(0, 2, 0);
        task.process(ChunkChange::Load(chunk)).unwrap();

        let world = world.get().unwrap();
        assert!(world.is_resident(chunk));
        assert!(world.contains(&Block::new(0, 40, 0)));

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            MeshEvent::Loaded(loaded, exposed) => {
                assert_eq!(*loaded, chunk);
                assert!(!exposed.is_empty());
                assert!(exposed.iter().all(|e| !e.faces.is_empty()));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn neighbours_are_refreshed_on_load_and_unload() {
        let (task, _world, recorder) = task(true);
        let a = ChunkId::new(0, 2, 0);
        let b = ChunkId::new(1, 2, 0);
        task.process(ChunkChange::Load(a)).unwrap();
        task.process(ChunkChange::Load(b)).unwrap();
        task.process(ChunkChange::Unload(b)).unwrap();

        let events = recorder.0.lock().unwrap();
        let kinds: Vec<_> = events
            .iter()
            .map(|event| match event {
                MeshEvent::Loaded(chunk, _) => ("loaded", *chunk),
                MeshEvent::Unloaded(chunk) => ("unloaded", *chunk),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("loaded", a),
                ("loaded", b),
                ("loaded", a),
                ("unloaded", b),
                ("loaded", a),
            ]
        );
    }

    #[test]
    fn refresh_can_be_disabled() {
        let (task, _world, recorder) = task(false);
        task.process(ChunkChange::Load(ChunkId::new(0, 2, 0))).unwrap();
        task.process(ChunkChange::Load(ChunkId::new(0, 3, 0))).unwrap();
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn invalid_changes_are_errors() {
        let (task, _world, _recorder) = task(true);
        let chunk = ChunkId::new(0, 0, 0);
        assert!(matches!(
            task.process(ChunkChange::Unload(chunk)),
            Err(WorldError::ChunkNotResident(_))
        ));
        task.process(ChunkChange::Load(chunk)).unwrap();
        assert!(matches!(
            task.process(ChunkChange::Load(chunk)),
            Err(WorldError::ChunkAlreadyResident(_))
        ));
    }
}
